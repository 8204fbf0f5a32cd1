use super::{Context, write_script};
use crate::cli::{CalibrateArgs, ElisaArgs, OutputArgs};
use crate::error::{CliError, Result};
use ot2protocols::core::io::templates::{LayeredTemplates, TEMPLATE_EXTENSION};
use ot2protocols::workflows::calibrate::{CalibrationProtocol, RobotConfig};
use ot2protocols::workflows::elisa::ElisaProtocol;
use ot2protocols::workflows::labware::LabwareProtocol;
use ot2protocols::workflows::protocol::Protocol;
use std::path::PathBuf;
use tracing::info;

pub async fn elisa(args: ElisaArgs, ctx: &Context) -> Result<()> {
    let protocol = ElisaProtocol::new(args.num_samples)?;
    generate(&protocol, &args.output, ctx)
}

pub async fn labware(args: OutputArgs, ctx: &Context) -> Result<()> {
    generate(&LabwareProtocol, &args, ctx)
}

pub async fn calibrate(args: CalibrateArgs, ctx: &Context) -> Result<()> {
    if args.list {
        print!("{}", render_calibration_list());
        return Ok(());
    }
    let (Some(config), Some(item)) = (args.robot_config.as_deref(), args.item.as_deref()) else {
        return Err(CliError::Argument(
            "calibrate needs --robot-config and --item unless --list is given".to_string(),
        ));
    };
    let robot_config: RobotConfig = config.parse()?;
    let protocol = CalibrationProtocol::new(robot_config, item)?;
    generate(&protocol, &args.output, ctx)
}

fn generate(protocol: &dyn Protocol, output: &OutputArgs, ctx: &Context) -> Result<()> {
    let config = ctx.resolve_config(Default::default())?;
    let templates = LayeredTemplates::new(config.templates_dir);

    info!("Generating protocol '{}'", protocol.short_name());
    let script = protocol.generate(&templates)?;

    let path = output
        .output
        .clone()
        .unwrap_or_else(|| default_output(protocol.short_name()));
    write_script(&path, &script)?;
    println!("✓ {} written to: {}", protocol.title(), path.display());
    Ok(())
}

pub fn default_output(short_name: &str) -> PathBuf {
    PathBuf::from(format!("{}.{}", short_name, TEMPLATE_EXTENSION))
}

pub fn render_calibration_list() -> String {
    CalibrationProtocol::all()
        .iter()
        .map(|p| format!("{:<8} {}\n", p.robot_config().as_str(), p.item()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn context(dir: &Path) -> Context {
        let config_path = dir.join("config.toml");
        std::fs::write(&config_path, "").unwrap();
        Context {
            config_path: Some(config_path),
            templates_dir: None,
            quiet: true,
        }
    }

    #[test]
    fn default_output_uses_the_protocol_name() {
        assert_eq!(default_output("elisa"), PathBuf::from("elisa.ot2"));
        assert_eq!(
            default_output("lowvol_tiprack_10ul"),
            PathBuf::from("lowvol_tiprack_10ul.ot2")
        );
    }

    #[test]
    fn calibration_list_has_one_line_per_protocol() {
        let list = render_calibration_list();
        assert_eq!(list.lines().count(), CalibrationProtocol::all().len());
        assert!(list.lines().any(|l| l.starts_with("lowvol") && l.ends_with("tiprack_10ul")));
        assert!(!list.lines().any(|l| l.starts_with("highvol") && l.ends_with("tiprack_10ul")));
    }

    #[tokio::test]
    async fn elisa_script_is_written_to_the_requested_path() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("elisa.ot2");
        let args = ElisaArgs {
            num_samples: 3,
            output: OutputArgs {
                output: Some(output.clone()),
            },
        };
        elisa(args, &context(dir.path())).await.unwrap();
        assert!(std::fs::read_to_string(output).unwrap().contains("\"num_samples\":3"));
    }

    #[tokio::test]
    async fn unknown_calibration_item_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let args = CalibrateArgs {
            robot_config: Some("highvol".to_string()),
            item: Some("tiprack_10ul".to_string()),
            list: false,
            output: OutputArgs {
                output: Some(dir.path().join("out.ot2")),
            },
        };
        let err = calibrate(args, &context(dir.path())).await.unwrap_err();
        assert!(matches!(err, CliError::Engine(_)));
    }
}
