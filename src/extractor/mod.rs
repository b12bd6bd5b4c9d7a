pub mod archive_page;
pub mod solution_page;
pub mod solver_name;

pub use archive_page::{ArchivePage, ArchivePageExtractor};
pub use solution_page::SolutionPageExtractor;
