//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads the `.env` file
//! - parses CLI arguments
//! - loads the paired series from the environment
//! - runs the requested fitting routine
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;

use crate::cli::{
    AlphaArgs, Command, CompareArgs, ExportArgs, ForestArgs, GamArgs, LogArgs, PiecewiseArgs,
    PlotArgs, PolyArgs, PowerArgs, SplineArgs, ToppArgs, ZeroEcArgs,
};
use crate::domain::{Dataset, FitQuality};
use crate::error::AppError;
use crate::models::{CalibModel, Predictor, predict_all};

/// Entry point for the `soilcal` binary.
pub fn run() -> Result<(), AppError> {
    crate::data::load_dotenv();
    let cli = crate::cli::Cli::parse();

    match cli.command {
        Command::Poly(args) => handle_poly(args),
        Command::Log(args) => handle_log(args),
        Command::Power(args) => handle_power(args),
        Command::Piecewise(args) => handle_piecewise(args),
        Command::Spline(args) => handle_spline(args),
        Command::Gam(args) => handle_gam(args),
        Command::Forest(args) => handle_forest(args),
        Command::Compare(args) => handle_compare(args),
        Command::Topp(args) => handle_topp(args),
        Command::Alpha(args) => handle_alpha(args),
        Command::ZeroEc(args) => handle_zero_ec(args),
    }
}

fn maybe_plot(plot: &PlotArgs, data: &Dataset, model: &dyn Predictor) {
    if plot.enabled() {
        println!(
            "{}",
            crate::plot::render_ascii_plot(data, Some(model), plot.width, plot.height)
        );
    }
}

fn maybe_export(
    export: &ExportArgs,
    data: &Dataset,
    model: &CalibModel,
    quality: &FitQuality,
) -> Result<(), AppError> {
    if let Some(path) = &export.export_model {
        let calibration = crate::io::build_calibration_file(data, model, quality);
        crate::io::write_model_json(path, &calibration)?;
        println!("Model written to {}", path.display());
    }
    Ok(())
}

fn handle_poly(args: PolyArgs) -> Result<(), AppError> {
    let data = crate::data::load_pair(&args.data.predictor_var, &args.data.response_var)?;
    let fit = crate::fit::fit_polynomial(&data, args.degree)?;

    print!(
        "{}",
        crate::report::format_header(&format!("polynomial regression (degree {})", args.degree), &data)
    );
    print!("{}", crate::report::format_polynomial(&fit.coeffs, &fit.quality));

    maybe_plot(&args.plot, &data, &fit.model);
    maybe_export(&args.export, &data, &fit.model, &fit.quality)
}

fn handle_log(args: LogArgs) -> Result<(), AppError> {
    let data = crate::data::load_pair(&args.data.predictor_var, &args.data.response_var)?;
    let fit = crate::fit::fit_logarithmic(&data)?;

    print!("{}", crate::report::format_header("logarithmic regression", &data));
    print!(
        "{}",
        crate::report::format_logarithmic(fit.a, fit.b, fit.dropped, &fit.quality)
    );

    maybe_plot(&args.plot, &data, &fit.model);
    maybe_export(&args.export, &data, &fit.model, &fit.quality)
}

fn handle_power(args: PowerArgs) -> Result<(), AppError> {
    let data = crate::data::load_pair(&args.data.predictor_var, &args.data.response_var)?;
    let opts = crate::fit::PowerFitOptions {
        exp_min: args.exp_min,
        exp_max: args.exp_max,
        exp_steps: args.exp_steps,
    };
    let fit = crate::fit::fit_power(&data, &opts)?;

    print!("{}", crate::report::format_header("power-law regression", &data));
    print!(
        "{}",
        crate::report::format_power(fit.a, fit.b, fit.c, &fit.quality)
    );

    maybe_plot(&args.plot, &data, &fit.model);
    maybe_export(&args.export, &data, &fit.model, &fit.quality)
}

fn handle_piecewise(args: PiecewiseArgs) -> Result<(), AppError> {
    let data = crate::data::load_pair(&args.data.predictor_var, &args.data.response_var)?;
    let fit = crate::fit::fit_piecewise(&data, args.min_segment)?;

    print!(
        "{}",
        crate::report::format_header("piecewise-linear regression", &data)
    );
    print!("{}", crate::report::format_piecewise(&fit));

    crate::io::write_coefficients_txt(&args.out, fit.breakpoint, &fit.left, &fit.right)?;
    println!("Coefficients written to {}", args.out.display());

    maybe_plot(&args.plot, &data, &fit.model);
    maybe_export(&args.export, &data, &fit.model, &fit.quality)
}

fn handle_spline(args: SplineArgs) -> Result<(), AppError> {
    let data = crate::data::load_pair(&args.data.predictor_var, &args.data.response_var)?;
    let opts = crate::fit::SplineFitOptions {
        knots: args.knot.clone(),
        curvature_sigma: args.curvature_sigma,
    };
    let fit = crate::fit::fit_spline(&data, &opts)?;

    print!("{}", crate::report::format_header("LSQ linear spline", &data));
    print!("{}", crate::report::format_spline(&fit));

    maybe_plot(&args.plot, &data, &fit.model);
    maybe_export(&args.export, &data, &fit.model, &fit.quality)
}

fn handle_gam(args: GamArgs) -> Result<(), AppError> {
    let data = crate::data::load_pair(&args.data.predictor_var, &args.data.response_var)?;
    let split = crate::data::train_test_split(&data, args.test_frac, args.seed)?;

    let opts = crate::fit::GamOptions {
        n_splines: args.splines,
        lambda_min: args.lambda_min,
        lambda_max: args.lambda_max,
        lambda_steps: args.lambda_steps,
    };
    let fit = crate::fit::fit_gam(&split.train, &opts)?;

    let y_test_fit = predict_all(&fit.model, &split.test.x);
    let test_mse = crate::math::mse(&split.test.y, &y_test_fit);

    print!("{}", crate::report::format_header("linear GAM", &data));
    print!("{}", crate::report::format_gam(&fit, Some(test_mse)));

    if let Some(reading) = args.predict {
        print!(
            "{}",
            crate::report::format_prediction(&data, reading, fit.model.predict(reading))
        );
    }

    maybe_plot(&args.plot, &data, &fit.model);
    Ok(())
}

fn handle_forest(args: ForestArgs) -> Result<(), AppError> {
    let data = crate::data::load_pair(&args.data.predictor_var, &args.data.response_var)?;
    let split = crate::data::train_test_split(&data, args.test_frac, args.seed)?;

    let opts = crate::fit::ForestOptions {
        n_trees: args.trees,
        min_leaf: args.min_leaf,
        max_depth: args.max_depth,
        seed: args.seed,
    };
    let model = crate::fit::fit_forest(&split.train, &opts)?;

    let y_train_fit = predict_all(&model, &split.train.x);
    let train_quality = crate::math::quality(&split.train.y, &y_train_fit);
    let y_test_fit = predict_all(&model, &split.test.x);
    let test_mse = crate::math::mse(&split.test.y, &y_test_fit);

    print!("{}", crate::report::format_header("random forest", &data));
    print!(
        "{}",
        crate::report::format_forest(model.n_trees(), &train_quality, Some(test_mse))
    );

    if let Some(reading) = args.predict {
        print!(
            "{}",
            crate::report::format_prediction(&data, reading, model.predict(reading))
        );
    }

    maybe_plot(&args.plot, &data, &model);
    Ok(())
}

fn handle_compare(args: CompareArgs) -> Result<(), AppError> {
    let data = crate::data::load_pair(&args.data.predictor_var, &args.data.response_var)?;
    let opts = crate::fit::CompareOptions {
        test_frac: args.test_frac,
        seed: args.seed,
    };
    let comparison = crate::fit::compare_models(&data, &opts)?;

    print!("{}", crate::report::format_header("model comparison", &data));
    print!("{}", crate::report::format_comparison(&comparison));
    Ok(())
}

fn handle_topp(args: ToppArgs) -> Result<(), AppError> {
    let data = crate::data::load_pair(&args.data.predictor_var, &args.data.response_var)?;
    let fit = crate::fit::fit_polynomial(&data, 3)?;

    print!("{}", crate::report::format_header("Topp equation", &data));
    print!("{}", crate::report::format_topp(&fit.coeffs, &fit.quality));

    maybe_plot(&args.plot, &data, &fit.model);
    maybe_export(&args.export, &data, &fit.model, &fit.quality)
}

fn handle_alpha(args: AlphaArgs) -> Result<(), AppError> {
    let data = crate::data::load_pair(&args.data.predictor_var, &args.data.response_var)?;
    let fit = crate::fit::fit_alpha(&data)?;

    print!("{}", crate::report::format_header("alpha determination", &data));
    print!(
        "{}",
        crate::report::format_alpha(fit.alpha, fit.beta, &fit.quality)
    );

    maybe_plot(&args.plot, &data, &fit.line);
    // The alpha line is a degree-1 polynomial as far as export is concerned.
    let model = CalibModel::Polynomial {
        coeffs: vec![fit.beta, fit.alpha],
    };
    maybe_export(&args.export, &data, &model, &fit.quality)
}

fn handle_zero_ec(_args: ZeroEcArgs) -> Result<(), AppError> {
    let inputs = crate::data::load_zero_ec_inputs()?;
    let fit = crate::fit::fit_zero_ec(&inputs.vwc, &inputs.bulk_ec)?;

    let data = Dataset::new("VWC_VALS", "BULK_EC", inputs.vwc, inputs.bulk_ec);
    print!(
        "{}",
        crate::report::format_header("zero-EC permittivity", &data)
    );
    print!(
        "{}",
        crate::report::format_zero_ec(fit.epsilon, &fit.quality)
    );
    Ok(())
}
