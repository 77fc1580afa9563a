pub mod clock;
pub mod enums;
pub mod fields;
pub mod invariants;

pub use enums::{ExecutionStatus, FlowType, MarketRegime, PortfolioType, Token, UnknownToken};
pub use fields::FieldReader;

/// Fresh app-assigned record identifier (UUID v4 token)
pub fn new_record_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod fields_tests;
