pub mod csv;
#[cfg(feature = "elf-listing")]
pub mod elf;
pub mod json;

pub use csv::CsvListingLoader;
#[cfg(feature = "elf-listing")]
pub use elf::ElfListingLoader;
pub use json::JsonListingLoader;
