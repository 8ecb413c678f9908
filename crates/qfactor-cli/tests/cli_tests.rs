//! CLI parsing, configuration and panel tests.

use std::io::Cursor;

use clap::Parser;
use qfactor_adapter_sim::SimulatorBackend;
use qfactor_adapter_sparse::SparseBackend;
use qfactor_cli::cli::{Cli, Commands};
use qfactor_cli::panel::prompt_u64;
use qfactor_cli::{PanelState, ReportKind, build_backends, load_config, on_trigger, render_markdown};
use qfactor_hal::Backend;

// ============================================================================
// Argument parsing
// ============================================================================

mod parsing {
    use super::*;

    #[test]
    fn test_factor_defaults_to_script_mode() {
        let cli = Cli::try_parse_from(["qfactor", "factor"]).unwrap();
        assert_eq!(cli.verbose, 0);
        match cli.command {
            Commands::Factor {
                number,
                base,
                qubits,
                timeout,
                backend,
                first,
                quiet,
                ..
            } => {
                assert_eq!(number, 15);
                assert_eq!(base, 7);
                assert_eq!(qubits, None);
                assert_eq!(timeout, None);
                assert_eq!(backend, "statevector");
                assert!(!first);
                assert!(!quiet);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_factor_flags() {
        let cli = Cli::try_parse_from([
            "qfactor", "-vv", "factor", "-n", "21", "-b", "2", "-q", "6", "-t", "2.5", "--first",
            "--backend", "sparse",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Factor {
            number,
            base,
            qubits,
            timeout,
            backend,
            first,
            ..
        } = cli.command
        else {
            panic!("expected factor");
        };
        assert_eq!((number, base, qubits), (21, 2, Some(6)));
        assert_eq!(timeout, Some(2.5));
        assert_eq!(backend, "sparse");
        assert!(first);
    }

    #[test]
    fn test_panel_inputs_are_optional() {
        let cli = Cli::try_parse_from(["qfactor", "panel"]).unwrap();
        let Commands::Panel {
            number,
            timeout,
            format,
        } = cli.command
        else {
            panic!("expected panel");
        };
        assert_eq!(number, None);
        assert_eq!(timeout, None);
        assert_eq!(format, "markdown");
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["qfactor", "backends", "--config", "q.yaml"]).unwrap();
        assert_eq!(cli.config.as_deref(), Some(std::path::Path::new("q.yaml")));
        assert!(matches!(cli.command, Commands::Backends));
    }

    #[test]
    fn test_rejects_bad_input() {
        assert!(Cli::try_parse_from(["qfactor"]).is_err());
        assert!(Cli::try_parse_from(["qfactor", "factor", "-n", "-3"]).is_err());
        assert!(Cli::try_parse_from(["qfactor", "circuit", "-q", "eight"]).is_err());
        assert!(Cli::try_parse_from(["qfactor", "launch"]).is_err());
    }
}

// ============================================================================
// Configuration
// ============================================================================

mod config {
    use super::*;

    #[test]
    fn test_explicit_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qfactor.yaml");
        std::fs::write(
            &path,
            "panel:\n  number: 21\nbackends:\n  - name: sparse\n    max_qubits: 40\n",
        )
        .unwrap();

        let config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config.panel.number, 21);

        let (dense, sparse) = build_backends(&config).unwrap();
        assert_eq!(dense.name(), "statevector");
        assert_eq!(sparse.capabilities().num_qubits, 40);
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(dir.path().join("absent.yaml").as_path())).is_err());
    }

    #[test]
    fn test_invalid_backend_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("qfactor.yaml");
        std::fs::write(&path, "backends:\n  - name: statevector\n    max_qubits: 99\n").unwrap();
        let config = load_config(Some(path.as_path())).unwrap();
        assert!(build_backends(&config).is_err());
    }
}

// ============================================================================
// Panel
// ============================================================================

mod panel {
    use super::*;

    #[test]
    fn test_prompt_reads_a_number() {
        let mut out = Vec::new();
        let n = prompt_u64(&mut Cursor::new("21\n"), &mut out, "Number", 14).unwrap();
        assert_eq!(n, 21);
        assert_eq!(String::from_utf8(out).unwrap(), "Number [14]: ");
    }

    #[test]
    fn test_prompt_empty_line_keeps_default() {
        let mut out = Vec::new();
        assert_eq!(prompt_u64(&mut Cursor::new("\n"), &mut out, "Timeout", 10).unwrap(), 10);
        assert_eq!(prompt_u64(&mut Cursor::new(""), &mut out, "Timeout", 10).unwrap(), 10);
        assert!(prompt_u64(&mut Cursor::new("ten\n"), &mut out, "Timeout", 10).is_err());
    }

    #[tokio::test]
    async fn test_trigger_factors_fifteen_on_both_backends() {
        let state = PanelState::new(15, 0);
        let reports = on_trigger(
            &state,
            SimulatorBackend::with_seed(3),
            SparseBackend::with_seed(3),
        )
        .await
        .unwrap();

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].backend, "Statevector");
        assert_eq!(reports[0].kind, ReportKind::AllFactors);
        assert!(!reports[0].factors.is_empty());
        assert!(reports[0].factors.iter().all(|f| *f == 3 || *f == 5));

        assert_eq!(reports[1].backend, "Sparse");
        assert_eq!(reports[1].kind, ReportKind::FirstFactor);
        assert_eq!(reports[1].factors.len(), 1);
        assert!(matches!(reports[1].factors[0], 3 | 5));

        let text = render_markdown(&state, &reports);
        assert!(text.starts_with("Factoring for: 15 (timeout: 0)\n"));
        assert!(text.contains("Statevector - Found factors: ["));
        assert!(text.contains("Sparse - Found factor: "));
    }

    #[tokio::test]
    async fn test_trigger_fourteen_times_out_on_statevector() {
        // Base 2 never yields a factor of 14, but the first-factor search
        // answers even numbers directly.
        let state = PanelState::new(14, 1);
        let reports = on_trigger(&state, SimulatorBackend::new(), SparseBackend::new())
            .await
            .unwrap();

        assert!(reports[0].timed_out());
        assert_eq!(reports[1].factors, vec![2]);
        assert_eq!(
            render_markdown(&state, &reports),
            "Factoring for: 14 (timeout: 1)\n\n\
             Statevector - TIMEOUT: no factor found\n\n\
             Sparse - Found factor: 2\n"
        );
    }

    #[tokio::test]
    async fn test_trigger_propagates_invalid_base() {
        let mut state = PanelState::new(15, 1);
        state.base = 3;
        let err = on_trigger(&state, SimulatorBackend::new(), SparseBackend::new())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Invalid base 3"));
    }
}
