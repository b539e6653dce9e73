pub type FramewiseResult<T> = Result<T, FramewiseError>;

#[derive(thiserror::Error, Debug)]
pub enum FramewiseError {
    #[error("construction error: {0}")]
    Construction(String),

    #[error("operand io error: {0}")]
    OperandIo(String),

    #[error("engine error: {0}")]
    Engine(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FramewiseError {
    pub fn construction(msg: impl Into<String>) -> Self {
        Self::Construction(msg.into())
    }

    pub fn operand_io(msg: impl Into<String>) -> Self {
        Self::OperandIo(msg.into())
    }

    pub fn engine(msg: impl Into<String>) -> Self {
        Self::Engine(msg.into())
    }

    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }
}
