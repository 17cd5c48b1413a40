//! `GPU_SETUP_DEBUG` handling.
//!
//! Kept in its own test binary: it mutates the process environment, which
//! must not race with other tests parsing arguments.

mod common;

use clap::Parser;
use common::{FakeRunner, TestHost};
use gpu_setup::cli::{wants_verbose, Cli};
use gpu_setup::App;

#[test]
fn test_debug_env_values_never_break_parsing() {
    let host = TestHost::new();
    let runner = FakeRunner::new();
    let journal = host.journal();
    let app = App::new(&host.config, &runner, &journal);
    let args = vec!["gpu-setup".to_string(), "version".to_string()];

    for (value, expected) in [
        ("1", true),
        ("yes", true),
        ("true", true),
        ("on", true),
        ("0", false),
        ("false", false),
        ("no", false),
    ] {
        std::env::set_var("GPU_SETUP_DEBUG", value);

        assert_eq!(app.run(&args), 0, "version must exit 0 with GPU_SETUP_DEBUG={}", value);
        assert_eq!(app.run(["gpu-setup", "status"]), 0, "GPU_SETUP_DEBUG={}", value);

        let cli = Cli::try_parse_from(&args).expect("parses");
        assert_eq!(cli.verbose, expected, "GPU_SETUP_DEBUG={}", value);
        assert_eq!(wants_verbose(&args), expected, "GPU_SETUP_DEBUG={}", value);
    }

    std::env::remove_var("GPU_SETUP_DEBUG");
    let cli = Cli::try_parse_from(["gpu-setup", "-v", "logs"]).expect("parses");
    assert!(cli.verbose);
}
