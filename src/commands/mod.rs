pub mod analyze;
pub mod apply;
pub mod archives;
pub mod dispatch;
pub mod helpers;
pub mod issues;
pub mod plan;
