//! Error macros for ctxopt

/// Return early with an invalid value error
#[macro_export]
macro_rules! bail_invalid {
    ($context:expr, $value:expr) => {
        return Err($crate::error::OptimizerError::invalid_value($context, $value))
    };
}

/// Return early with a usage error
#[macro_export]
macro_rules! bail_usage {
    ($msg:expr) => {
        return Err($crate::error::OptimizerError::UsageError($msg.to_string()))
    };
}
