use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("No compute platform found (backends: {0})")]
    NoPlatform(String),
    #[error("No matching device on platform {platform}")]
    NoDevice { platform: String },
    #[error("Adapter index {index} out of range ({count} adapters)")]
    AdapterIndexOutOfRange { index: usize, count: usize },
    #[error("Device request failed: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),
    #[error("Failed to compile {label}:\n{log}")]
    Compile { label: String, log: String },
    #[error("Kernel {kernel} is not an entry point of {program}")]
    UnknownKernel { program: String, kernel: String },
    #[error("Buffer {0} would be empty")]
    EmptyBuffer(String),
    #[error("Buffer {label} is {size} bytes, device limit is {limit}")]
    BufferTooLarge { label: String, size: u64, limit: u64 },
    #[error("Buffer {label} holds {expected} elements, got {actual}")]
    LengthMismatch {
        label: String,
        expected: usize,
        actual: usize,
    },
    #[error("Index space has a zero dimension: {0:?}")]
    EmptyIndexSpace([u32; 3]),
    #[error("Dispatch of {workgroups:?} workgroups exceeds the per-dimension limit {limit}")]
    DispatchTooLarge { workgroups: [u32; 3], limit: u32 },
    #[error("Dispatch of {kernel} failed:\n{log}")]
    Dispatch { kernel: String, log: String },
    #[error("Mapping buffer {label} failed: {source}")]
    Map {
        label: String,
        #[source]
        source: wgpu::BufferAsyncError,
    },
    #[error("Mapping callback for {0} was dropped")]
    MapCancelled(String),
}

pub type BackendResult<T> = Result<T, BackendError>;
