//! Command-line parsing for the soil-moisture calibration fitter.
//!
//! One subcommand per fitting routine; argument parsing and dispatch stay
//! separate from the modeling/math code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "soilcal",
    version,
    about = "Soil-moisture sensor calibration fitter (.env-driven)"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a polynomial of the given degree.
    Poly(PolyArgs),
    /// Fit a logarithmic model `y = a + b ln(x)`.
    Log(LogArgs),
    /// Fit a power-law model `y = a x^b + c` by exponent grid search.
    Power(PowerArgs),
    /// Two-segment piecewise-linear fit with BIC breakpoint search.
    Piecewise(PiecewiseArgs),
    /// LSQ linear spline with user or automatic knots.
    Spline(SplineArgs),
    /// Penalized-spline linear GAM with GCV-selected smoothing.
    Gam(GamArgs),
    /// Random forest regressor.
    Forest(ForestArgs),
    /// Fit a suite of regressors and rank them by test MSE.
    Compare(CompareArgs),
    /// Fit the Topp cubic between VWC and dielectric permittivity.
    Topp(ToppArgs),
    /// Determine the alpha parameter from VWC/permittivity data.
    Alpha(AlphaArgs),
    /// Estimate dielectric permittivity at zero bulk EC.
    ZeroEc(ZeroEcArgs),
}

/// Which environment variables hold the paired series.
#[derive(Debug, Parser, Clone)]
pub struct DataArgs {
    /// Environment variable name for the predictor (sensor reading) series.
    #[arg(short = 'p', long, default_value = "HUMIDITY_VALS")]
    pub predictor_var: String,

    /// Environment variable name for the response series.
    #[arg(short = 'r', long, default_value = "VWC_VALS")]
    pub response_var: String,
}

/// Same, with permittivity-flavored defaults for the dielectric fits.
#[derive(Debug, Parser, Clone)]
pub struct DielectricDataArgs {
    /// Environment variable name for the VWC series.
    #[arg(short = 'p', long, default_value = "VWC_VALS")]
    pub predictor_var: String,

    /// Environment variable name for the permittivity series.
    #[arg(short = 'r', long, default_value = "DP_VALS")]
    pub response_var: String,
}

/// Terminal plot options.
#[derive(Debug, Parser, Clone)]
pub struct PlotArgs {
    /// Render an ASCII plot in the terminal (enabled by default).
    #[arg(long, default_value_t = true)]
    pub plot: bool,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

impl PlotArgs {
    pub fn enabled(&self) -> bool {
        self.plot && !self.no_plot
    }
}

/// Model export options.
#[derive(Debug, Parser, Clone)]
pub struct ExportArgs {
    /// Export the fitted model (parameters + curve grid) to JSON.
    #[arg(long = "export-model", value_name = "JSON")]
    pub export_model: Option<PathBuf>,
}

#[derive(Debug, Parser)]
pub struct PolyArgs {
    /// Degree of the polynomial model to fit.
    #[arg(short = 'd', long)]
    pub degree: usize,

    #[command(flatten)]
    pub data: DataArgs,
    #[command(flatten)]
    pub plot: PlotArgs,
    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Debug, Parser)]
pub struct LogArgs {
    #[command(flatten)]
    pub data: DataArgs,
    #[command(flatten)]
    pub plot: PlotArgs,
    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Debug, Parser)]
pub struct PowerArgs {
    /// Lower bound of the exponent grid.
    #[arg(long, default_value_t = 0.05)]
    pub exp_min: f64,

    /// Upper bound of the exponent grid.
    #[arg(long, default_value_t = 5.0)]
    pub exp_max: f64,

    /// Number of coarse exponent candidates.
    #[arg(long, default_value_t = 120)]
    pub exp_steps: usize,

    #[command(flatten)]
    pub data: DataArgs,
    #[command(flatten)]
    pub plot: PlotArgs,
    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Debug, Parser)]
pub struct PiecewiseArgs {
    /// Minimum number of observations per segment.
    #[arg(long, default_value_t = 10)]
    pub min_segment: usize,

    /// Where to write the coefficients text file.
    #[arg(long, default_value = "coefficients.txt")]
    pub out: PathBuf,

    #[command(flatten)]
    pub data: DataArgs,
    #[command(flatten)]
    pub plot: PlotArgs,
    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Debug, Parser)]
pub struct SplineArgs {
    /// Interior knot value(s); omit for automatic curvature-based placement.
    #[arg(short = 'k', long = "knot", value_name = "X", num_args = 1..)]
    pub knot: Option<Vec<f64>>,

    /// Curvature threshold in standard deviations (automatic mode).
    #[arg(long, default_value_t = 2.0)]
    pub curvature_sigma: f64,

    #[command(flatten)]
    pub data: DataArgs,
    #[command(flatten)]
    pub plot: PlotArgs,
    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Debug, Parser)]
pub struct GamArgs {
    /// Number of spline basis knots.
    #[arg(long, default_value_t = 20)]
    pub splines: usize,

    /// Smoothing grid lower bound.
    #[arg(long, default_value_t = 1e-3)]
    pub lambda_min: f64,

    /// Smoothing grid upper bound.
    #[arg(long, default_value_t = 1e3)]
    pub lambda_max: f64,

    /// Smoothing grid resolution.
    #[arg(long, default_value_t = 25)]
    pub lambda_steps: usize,

    /// Held-out test fraction.
    #[arg(long, default_value_t = 0.2)]
    pub test_frac: f64,

    /// Seed for the train/test shuffle.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Predict the response for one sensor reading after fitting.
    #[arg(long, value_name = "READING")]
    pub predict: Option<f64>,

    #[command(flatten)]
    pub data: DataArgs,
    #[command(flatten)]
    pub plot: PlotArgs,
}

#[derive(Debug, Parser)]
pub struct ForestArgs {
    /// Number of trees.
    #[arg(long, default_value_t = 100)]
    pub trees: usize,

    /// Minimum samples per leaf.
    #[arg(long, default_value_t = 1)]
    pub min_leaf: usize,

    /// Optional depth cap per tree.
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Held-out test fraction.
    #[arg(long, default_value_t = 0.2)]
    pub test_frac: f64,

    /// Seed for the split shuffle and the bootstrap.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Predict the response for one sensor reading after fitting.
    #[arg(long, value_name = "READING")]
    pub predict: Option<f64>,

    #[command(flatten)]
    pub data: DataArgs,
    #[command(flatten)]
    pub plot: PlotArgs,
}

#[derive(Debug, Parser)]
pub struct CompareArgs {
    /// Held-out test fraction.
    #[arg(long, default_value_t = 0.2)]
    pub test_frac: f64,

    /// Seed for the train/test shuffle (also feeds the forest bootstrap).
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[command(flatten)]
    pub data: DataArgs,
}

#[derive(Debug, Parser)]
pub struct ToppArgs {
    #[command(flatten)]
    pub data: DielectricDataArgs,
    #[command(flatten)]
    pub plot: PlotArgs,
    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Debug, Parser)]
pub struct AlphaArgs {
    #[command(flatten)]
    pub data: DielectricDataArgs,
    #[command(flatten)]
    pub plot: PlotArgs,
    #[command(flatten)]
    pub export: ExportArgs,
}

#[derive(Debug, Parser)]
pub struct ZeroEcArgs {}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn poly_parses_short_flags() {
        let cli = Cli::try_parse_from(["soilcal", "poly", "-d", "3", "-p", "RAW", "-r", "VWC"]).unwrap();
        match cli.command {
            Command::Poly(args) => {
                assert_eq!(args.degree, 3);
                assert_eq!(args.data.predictor_var, "RAW");
                assert_eq!(args.data.response_var, "VWC");
                assert!(args.plot.enabled());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn spline_accepts_multiple_knots() {
        let cli = Cli::try_parse_from(["soilcal", "spline", "--knot", "10.5", "28.0"]).unwrap();
        match cli.command {
            Command::Spline(args) => assert_eq!(args.knot, Some(vec![10.5, 28.0])),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn no_plot_wins_over_default() {
        let cli = Cli::try_parse_from(["soilcal", "log", "--no-plot"]).unwrap();
        match cli.command {
            Command::Log(args) => assert!(!args.plot.enabled()),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
