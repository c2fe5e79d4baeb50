pub mod config;
pub mod job;
pub mod metrics;
pub mod parser;
pub mod prober;
pub mod registry;
pub mod runner;
pub mod testing;
pub mod toolchain;

pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, Config,
    ConfigError, ServerConfig,
};
pub use job::{
    AudioFormat, DownloadMode, DownloadRequest, Job, JobError, JobErrorKind, JobEvent, JobId,
    JobProgress, JobStatus, ValidationError, VideoContainer, VideoQuality,
};
pub use parser::{parse_line, ParsedEvent, PhaseMarker, ProgressSample};
pub use prober::{MetadataProber, PlaylistEntry, ProbeError, ProberConfig, VideoInfo};
pub use registry::{JobRegistry, RegistryConfig, RegistryError, RegistryStatus};
pub use runner::{
    CommandSpec, ExitOutcome, OutputLine, ProcessHandle, ProcessRunner, RunnerConfig,
    RunnerError, RunningProcess, StreamKind, TokioProcessRunner,
};
pub use toolchain::{BinaryStatus, LocalToolchain, ToolConfig, Toolchain};
