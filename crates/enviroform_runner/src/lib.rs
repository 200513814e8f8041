//! # enviroform_runner
//!
//! Subprocess execution wrapper for enviroform.
//!
//! Every command the wrapper derives is handed to a [`CommandRunner`]. The
//! real implementation spawns a child process that inherits the terminal;
//! the mock implementation records calls for tests.
//!
//! # Features
//!
//! - **Inherited stdio**: the engine talks to the user's terminal directly
//! - **Bounded wait**: a timed-out child is killed and reaped
//! - **Interrupt tolerance**: Ctrl-C reaches the child, the wrapper keeps waiting
//! - **Mock Runner**: for testing without spawning processes
//!
//! # Example
//!
//! ```rust,no_run
//! use enviroform_runner::{CommandRunner, CommandSpec, ProcessRunner, RunConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let runner = ProcessRunner::default();
//!
//!     let spec = CommandSpec::new("terraform")
//!         .arg("version")
//!         .working_dir("terraform/apps/example-app");
//!
//!     let result = runner.run(&spec, &RunConfig::default()).await?;
//!     println!("Exit code: {}", result.exit_code);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod mock;
pub mod process;
pub mod runner;

pub use config::{CommandSpec, RunConfig};
pub use error::{RunnerError, RunnerResult};
pub use mock::{CapturedCall, MockResponse, MockRunner};
pub use process::{ProcessRunner, ProcessRunnerOptions};
pub use runner::{CommandRunner, ExecutionResult};
