pub mod certificate;
pub mod challenge;
pub mod gallery;
pub mod project;
pub mod research;
pub mod site;

pub use certificate::Certificate;
pub use challenge::Challenge;
pub use gallery::GalleryItem;
pub use project::Project;
pub use research::ResearchItem;
pub use site::SiteSettings;
