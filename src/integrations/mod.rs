pub mod notion;

pub use notion::NotionExporter;
