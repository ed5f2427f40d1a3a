//! Name heuristics for library, runtime, and startup symbols.
//!
//! Everything here is a pure function of the symbol name. The lookup tables are
//! immutable and built once on first use.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

/// Names that must never be stubbed or skipped, even when another rule matches.
pub const DO_NOT_TOUCH: &[&str] = &["entry", "_start", "_init", "topThread", "cmd_sem_init"];

/// Loader/runtime bootstrap symbols that are skipped outright.
pub const SYSTEM_FUNCTION_NAMES: &[&str] = &[
    "entry",
    "_start",
    "_init",
    "_fini",
    "abort",
    "exit",
    "_exit",
    "_profiler_start",
    "_profiler_stop",
    "__main",
    "__do_global_ctors",
    "__do_global_dtors",
    "_GLOBAL__sub_I_",
    "_GLOBAL__sub_D_",
    "__ctor_list",
    "__dtor_list",
    "_edata",
    "_end",
    "etext",
    "__exidx_start",
    "__exidx_end",
    "_ftext",
    "__bss_start",
    "__bss_start__",
    "__bss_end__",
    "__end__",
    "_stack",
    "_dso_handle",
];

/// Vendor SDK prefixes, compared case-insensitively.
pub const VENDOR_API_PREFIXES: &[&str] =
    &["sce", "sif", "pad", "gs", "dma", "iop", "vif", "spu", "mc", "libc"];

/// Well-known C library entry points.
pub const KNOWN_STDLIB_NAMES: &[&str] = &[
    // stdio
    "printf", "sprintf", "snprintf", "fprintf", "vprintf", "vfprintf", "vsprintf", "vsnprintf",
    "puts", "putchar", "getchar", "gets", "fgets", "fputs", "scanf", "fscanf", "sscanf",
    "sprint", "sbprintf",
    // allocation
    "malloc", "free", "calloc", "realloc", "aligned_alloc", "posix_memalign",
    // memory and strings
    "memcpy", "memset", "memmove", "memcmp", "memcpy2", "memchr", "bcopy", "bzero",
    "strcpy", "strncpy", "strcat", "strncat", "strcmp", "strncmp", "strlen", "strstr",
    "strchr", "strrchr", "strdup", "strtok", "strtok_r", "strerror",
    // files
    "fopen", "fclose", "fread", "fwrite", "fseek", "ftell", "rewind", "fflush",
    "fgetc", "feof", "ferror", "clearerr", "fileno", "tmpfile", "remove", "rename",
    "open", "close", "read", "write", "lseek", "stat", "fstat",
    // conversion and math
    "atoi", "atol", "atoll", "atof", "strtol", "strtoul", "strtoll", "strtoull", "strtod",
    "strtof", "rand", "srand", "random", "srandom", "drand48", "sqrt", "pow", "exp", "log",
    "log10", "sin", "cos", "tan", "asin", "acos", "atan", "atan2", "sinh", "cosh", "tanh",
    "floor", "ceil", "fabs", "fmod", "frexp", "ldexp", "modf",
    // time
    "time", "ctime", "clock", "difftime", "mktime", "localtime", "gmtime", "asctime",
    "strftime", "gettimeofday", "nanosleep", "usleep",
    // process and misc
    "atexit", "system", "getpid", "fork", "waitpid",
    "qsort", "bsearch", "abs", "div", "labs", "ldiv", "llabs", "lldiv",
    "isalnum", "isalpha", "isdigit", "islower", "isupper", "isspace", "tolower", "toupper",
    "setjmp", "longjmp", "getenv", "setenv", "unsetenv",
    "perror", "fputc", "getc", "ungetc", "freopen", "setvbuf", "setbuf",
    "strnlen", "strspn", "strcspn", "strcasecmp", "strncasecmp",
];

/// Prefixes the disassembler assigns to functions it could not name.
const PLACEHOLDER_PREFIXES: &[&str] = &["sub_", "FUN_", "func_", "entry_", "function_", "LAB_"];

const KERNEL_VERBS: &[&str] = &[
    "Create", "Delete", "Start", "ExitDelete", "Exit", "Terminate", "Suspend", "Resume", "Sleep",
    "Wakeup", "CancelWakeup", "Change", "Rotate", "Release", "Setup", "Register", "Query", "Get",
    "Set", "Refer", "Poll", "Wait", "Signal", "Enable", "Disable", "Flush", "Reset", "Add", "Init",
];

const KERNEL_NOUNS: &[&str] = &[
    "Thread", "Sema", "EventFlag", "Alarm", "Intc", "IntcHandler2", "Dmac", "DmacHandler2",
    "OsdConfigParam", "MemorySize", "VSyncFlag", "Heap", "TLS", "Status", "Cache", "Syscall",
    "TLB", "TLBEntry", "GsCrt",
];

/// Whole-name kernel exceptions that do not follow the verb/noun grammar.
const KERNEL_EXCEPTIONS: &[&str] =
    &["EndOfHeap", "GsGetIMR", "GsPutIMR", "Deci2Call", "Sif[A-Za-z0-9_]+"];

/// Interrupt-context variants, spelled with a leading lowercase `i`.
const INTERRUPT_VARIANTS: &[&str] = &[
    "SignalSema",
    "PollSema",
    "ReferSemaStatus",
    "SetEventFlag",
    "ClearEventFlag",
    "PollEventFlag",
    "ReferEventFlagStatus",
    "WakeupThread",
    "CancelWakeupThread",
    "ReleaseWaitThread",
    "SetAlarm",
    "CancelAlarm",
    "FlushCache",
    "sceSifSetDma",
    "sceSifSetDChain",
];

const C_LIBRARY_FAMILIES: &str = "^_*(mem|str|time|f?printf|f?scanf|malloc|free|calloc|realloc|\
atoi|itoa|rand|srand|abort|exit|atexit|getenv|system|bsearch|qsort|abs|labs|div|ldiv|mblen|\
mbtowc|wctomb|mbstowcs|wcstombs).*";

fn kernel_runtime_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        let source = format!(
            "^(?:(?:{})(?:{})|{}|i(?:{}))$",
            KERNEL_VERBS.join("|"),
            KERNEL_NOUNS.join("|"),
            KERNEL_EXCEPTIONS.join("|"),
            INTERRUPT_VARIANTS.join("|"),
        );
        Regex::new(&source).expect("kernel runtime pattern is valid")
    })
}

fn c_library_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(C_LIBRARY_FAMILIES).expect("C library pattern is valid"))
}

fn stdlib_names() -> &'static HashSet<&'static str> {
    static NAMES: OnceLock<HashSet<&'static str>> = OnceLock::new();
    NAMES.get_or_init(|| KNOWN_STDLIB_NAMES.iter().copied().collect())
}

fn system_names() -> &'static HashSet<&'static str> {
    static NAMES: OnceLock<HashSet<&'static str>> = OnceLock::new();
    NAMES.get_or_init(|| SYSTEM_FUNCTION_NAMES.iter().copied().collect())
}

/// Whether `name` is in the do-not-touch allowlist.
pub fn is_do_not_touch(name: &str) -> bool {
    DO_NOT_TOUCH.contains(&name)
}

/// Strip a single leading underscore, keeping a lone `_` as is.
pub fn strip_alias_underscore(name: &str) -> &str {
    match name.strip_prefix('_') {
        Some(rest) if !rest.is_empty() => rest,
        _ => name,
    }
}

/// Whether a name looks like a real symbol rather than a generated placeholder.
///
/// Rejects empty names, names without letters, disassembler placeholders
/// (`sub_`, `FUN_`, ...) and bare hex literals such as `0x80001234`.
pub fn has_reliable_symbol_name(name: &str) -> bool {
    if name.is_empty() {
        return false;
    }
    if PLACEHOLDER_PREFIXES.iter().any(|prefix| name.starts_with(prefix)) {
        return false;
    }
    if !name.chars().any(char::is_alphabetic) {
        return false;
    }

    let hex_literal_chars =
        name.chars().all(|c| c.is_ascii_hexdigit() || matches!(c, 'x' | 'X' | '_'));
    !((name.starts_with("0x") || name.starts_with("0X")) && hex_literal_chars)
}

/// Exact match against `names`, treating `n`, `_n` and the stripped form as aliases.
fn matches_with_alias(candidate: &str, names: &HashSet<&'static str>) -> bool {
    if candidate.is_empty() {
        return false;
    }
    if names.contains(candidate) {
        return true;
    }
    let stripped = strip_alias_underscore(candidate);
    if stripped != candidate && names.contains(stripped) {
        return true;
    }
    !candidate.starts_with('_') && names.contains(format!("_{candidate}").as_str())
}

fn has_vendor_prefix(name: &str) -> bool {
    let base = strip_alias_underscore(name).to_ascii_lowercase();
    VENDOR_API_PREFIXES.iter().any(|prefix| base.starts_with(prefix))
}

/// Kernel/runtime grammar: verb + noun, fixed exceptions, or an `i`-prefixed ISR variant.
pub fn matches_kernel_runtime_name(name: &str) -> bool {
    kernel_runtime_pattern().is_match(name)
}

/// Library/runtime test: names whose effect is emulated by a stub.
pub fn is_library_function_name(name: &str) -> bool {
    if !has_reliable_symbol_name(name) {
        return false;
    }

    let normalized = strip_alias_underscore(name);
    matches_kernel_runtime_name(normalized)
        || matches_with_alias(normalized, stdlib_names())
        || has_vendor_prefix(normalized)
        || c_library_pattern().is_match(normalized)
}

/// System test: loader/bootstrap artifacts left to the surrounding runtime.
pub fn is_system_symbol_name(name: &str) -> bool {
    if !has_reliable_symbol_name(name) {
        return false;
    }
    system_names().contains(name) || name.starts_with("__") || name.starts_with('.')
}
