pub mod aggregator;
pub mod checker;
pub mod logging;
pub mod report;

pub use aggregator::BalanceAggregator;
pub use checker::{BalanceChecker, ConnectFn};
pub use logging::{init_logging, LogFormat};
pub use report::{render_json, render_text};
