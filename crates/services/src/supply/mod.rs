//! Item supply: asking a generation source or a static corpus for a pool.

pub mod parse;
pub mod pipeline;
pub mod prompt;
pub mod source;

pub use parse::{ParseReport, parse_lines};
pub use pipeline::{SupplyConfig, SupplyKind, SupplyPipeline, select_from_corpus};
pub use prompt::{explanation_prompt, item_instruction, request_count};
pub use source::{ChatCompletionsSource, GenerationSource, GeneratorConfig};
