use stubmap_core::analysis::names::{is_library_function_name, KNOWN_STDLIB_NAMES};
use stubmap_core::analysis::{classify, classify_name, Classification, NoThunks};
use stubmap_core::model::ListedFunction;
use stubmap_core::services::listing::FunctionTable;

fn thunk(name: &str, entry: u32, target: Option<u32>) -> ListedFunction {
    ListedFunction::new(name, entry, 8).with_thunk(target)
}

#[test]
fn alias_forms_of_stdlib_names_classify_identically() {
    for name in KNOWN_STDLIB_NAMES {
        let plain = classify_name(name);
        let aliased = classify_name(&format!("_{name}"));
        assert!(matches!(plain, Classification::Stub(_)), "{name} should be a stub");
        assert!(matches!(aliased, Classification::Stub(_)), "_{name} should be a stub");
    }
}

#[test]
fn placeholder_names_are_never_classified() {
    for name in ["sub_00100000", "FUN_80001234", "0x80001234", "func_printf", "LAB_memcpy"] {
        assert_eq!(classify_name(name), Classification::None, "{name}");
    }
}

#[test]
fn placeholder_thunks_without_library_target_stay_uncategorized() {
    let table = FunctionTable::new(
        "test",
        vec![
            thunk("FUN_80002000", 0x2000, Some(0x3000)),
            ListedFunction::new("myHelper", 0x3000, 16),
        ],
    );
    let result = classify(table.get(0x2000).unwrap(), &table);
    assert_eq!(result, Classification::None);
}

#[test]
fn allowlist_beats_every_other_rule() {
    for name in ["entry", "_start", "_init", "topThread", "cmd_sem_init"] {
        assert_eq!(classify_name(name), Classification::None, "{name}");
        let as_thunk = thunk(name, 0x10, None);
        assert_eq!(classify(&as_thunk, &NoThunks), Classification::None, "{name} thunk");
    }
    // `_init` would otherwise match the system table.
    assert_eq!(classify_name("_fini"), Classification::Skip("_fini".into()));
}

#[test]
fn missing_or_empty_names_are_uncategorized() {
    let mut unnamed = ListedFunction::new("x", 0x100, 4);
    unnamed.name = None;
    assert_eq!(classify(&unnamed, &NoThunks), Classification::None);
    unnamed.name = Some(String::new());
    assert_eq!(classify(&unnamed, &NoThunks), Classification::None);
}

#[test]
fn thunk_takes_target_name_when_own_name_is_unknown() {
    let table = FunctionTable::new(
        "test",
        vec![
            thunk("FUN_80002000", 0x8000_2000, Some(0x100)),
            ListedFunction::new("printf", 0x100, 64),
        ],
    );
    let result = classify(table.get(0x8000_2000).unwrap(), &table);
    assert_eq!(result, Classification::Stub("printf".into()));
}

#[test]
fn thunk_prefers_its_own_library_name() {
    let table = FunctionTable::new(
        "test",
        vec![thunk("_memset", 0x200, Some(0x100)), ListedFunction::new("sceCdRead", 0x100, 64)],
    );
    let result = classify(table.get(0x200).unwrap(), &table);
    assert_eq!(result, Classification::Stub("_memset".into()));
}

#[test]
fn thunk_without_target_falls_back_to_system_test() {
    let table = FunctionTable::new("test", vec![thunk("__fini", 0x400, None)]);
    let result = classify(table.get(0x400).unwrap(), &table);
    assert_eq!(result, Classification::Skip("__fini".into()));
}

#[test]
fn thunk_follows_chain_but_survives_cycles() {
    let table = FunctionTable::new(
        "test",
        vec![
            thunk("FUN_00000010", 0x10, Some(0x20)),
            thunk("FUN_00000020", 0x20, Some(0x30)),
            ListedFunction::new("strcpy", 0x30, 32),
            thunk("FUN_00000040", 0x40, Some(0x50)),
            thunk("FUN_00000050", 0x50, Some(0x40)),
        ],
    );
    assert_eq!(classify(table.get(0x10).unwrap(), &table), Classification::Stub("strcpy".into()));
    assert_eq!(classify(table.get(0x40).unwrap(), &table), Classification::None);
}

#[test]
fn non_thunk_ignores_forwarding_metadata() {
    let mut f = ListedFunction::new("gameUpdate", 0x500, 16);
    f.thunk_target = Some(0x100);
    let table = FunctionTable::new("test", vec![f.clone(), ListedFunction::new("printf", 0x100, 8)]);
    assert_eq!(classify(&f, &table), Classification::None);
}

#[test]
fn kernel_and_vendor_names_are_stubs() {
    for name in ["CreateThread", "_iSignalSema", "SifCallRpc", "GsPutIMR", "scePadRead"] {
        assert!(is_library_function_name(name), "{name}");
        assert_eq!(classify_name(name), Classification::Stub(name.to_string()));
    }
    // Verb without a known noun is application code.
    assert_eq!(classify_name("ResetEE"), Classification::None);
}
