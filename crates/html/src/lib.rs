//! HTML format boundary for the slide document model: boundary detection,
//! element extraction, synthesis, and section splicing.

pub mod detect;
pub mod extract;
pub mod import;
pub mod section;
pub mod splice;
pub mod synthesize;

pub use detect::{BoundaryDetector, BoundaryStrategy};
pub use extract::extract_elements;
pub use import::HtmlImporter;
pub use section::{HtmlSection, SectionKind};
pub use splice::{extract_for_refinement, splice_back};
pub use synthesize::HtmlSynthesizer;
