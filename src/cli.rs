// cli.rs - Command-line interface configuration
use std::path::PathBuf;

use clap::Parser;

use crate::demos::DemoKind;

#[derive(Parser, Debug, Clone)]
#[command(name = "parascene")]
#[command(about = "Interactive parametric scene demos", long_about = None)]
pub struct Cli {
    /// Which demo to run: basic, mesh-basic, mesh-standard, or light
    #[arg(default_value = "basic", value_parser = parse_demo)]
    pub demo: DemoKind,

    /// Disable the control panel overlay
    #[arg(long = "no-ui", default_value = "false")]
    pub no_ui: bool,

    /// Print the demo's registered parameters as JSON and exit
    #[arg(long = "dump-params", default_value = "false")]
    pub dump_params: bool,

    /// Directory holding the textures/ tree
    #[arg(long = "assets-root", default_value = ".")]
    pub assets_root: PathBuf,
}

fn parse_demo(name: &str) -> Result<DemoKind, String> {
    DemoKind::from_name(name).ok_or_else(|| {
        let names: Vec<&str> = DemoKind::ALL.iter().map(|k| k.name()).collect();
        format!("unknown demo '{name}', expected one of: {}", names.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_demo_name() {
        for kind in DemoKind::ALL {
            let cli = Cli::parse_from(["parascene", kind.name()]);
            assert_eq!(cli.demo, kind);
        }
    }

    #[test]
    fn defaults_to_basic_with_ui() {
        let cli = Cli::parse_from(["parascene"]);
        assert_eq!(cli.demo, DemoKind::Basic);
        assert!(!cli.no_ui);
        assert!(!cli.dump_params);
    }

    #[test]
    fn rejects_unknown_demo() {
        assert!(Cli::try_parse_from(["parascene", "warp"]).is_err());
    }
}
