mod parser;

pub use parser::{merge_links, parse_summary, SummaryParser, SummaryResult};
