//! hidim CLI binary.
//!
//! Provides command-line access to penalized regression, cross-validated
//! penalty selection and differential expression testing.

mod render;
mod simulate;

use clap::{Args, Parser, Subcommand, ValueEnum};
use hidim::data::{Design, ExpressionSet, ExpressionSimulation, SparseLinearModel};
use hidim::output::{CoefficientTable, PathSummary};
use hidim::penalized::{FoldStatus, OlsConfig, OrdinaryLeastSquares, SelectionRule, ValidationLoss};
use hidim::testing::{AdjustmentMethod, TTestVariant};
use hidim::workflow::{load_survival_design, parse_group_labels, read_group_labels};
use hidim::{DifferentialExpression, RegularizedWorkflow, WorkflowConfig};
use indicatif::{ProgressBar, ProgressStyle};
use render::{OutputFormat, export_table, print_table};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "hidim")]
#[command(about = "hidim: high-dimensional regression and testing", long_about = None)]
#[command(version)]
struct Cli {
    /// Workflow configuration (JSON); command-line flags override it
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct DataArgs {
    /// CSV file with a header row
    #[arg(long)]
    data: PathBuf,

    /// Response column
    #[arg(long)]
    response: String,

    /// Feature columns, comma-separated (default: every other numeric column)
    #[arg(long, value_delimiter = ',')]
    features: Option<Vec<String>>,
}

impl DataArgs {
    fn load(&self) -> Result<Design, Box<dyn Error>> {
        let design = Design::from_csv(&self.data, &self.response, self.features.as_deref())?;
        log::info!(
            "Loaded {}: {} observations, {} features",
            self.data.display(),
            design.n_observations(),
            design.n_features()
        );
        Ok(design)
    }

    fn dataset(&self) -> String {
        self.data.display().to_string()
    }
}

#[derive(Args)]
struct ModelArgs {
    /// Elastic-Net mixing: 0 = Ridge, 1 = Lasso
    #[arg(long)]
    alpha: Option<f64>,

    /// Number of penalty values on the path
    #[arg(long)]
    n_lambda: Option<usize>,

    /// Smallest penalty as a fraction of the largest
    #[arg(long)]
    min_ratio: Option<f64>,

    /// Penalize features on their original scale
    #[arg(long)]
    no_standardize: bool,
}

impl ModelArgs {
    fn apply(&self, config: &mut WorkflowConfig) {
        if let Some(alpha) = self.alpha {
            config.model.alpha = alpha;
        }
        if let Some(n) = self.n_lambda {
            config.model.path.n_lambda = n;
        }
        if self.min_ratio.is_some() {
            config.model.path.min_ratio = self.min_ratio;
        }
        if self.no_standardize {
            config.model.preprocessing.standardize = false;
        }
    }
}

#[derive(Args)]
struct OutputArgs {
    /// Format printed to stdout
    #[arg(long, value_enum, default_value_t = OutputFormat::Ascii)]
    format: OutputFormat,

    /// Export the main table to a .csv or .json file
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print every n-th point of long paths and curves
    #[arg(long, default_value = "10")]
    step: usize,
}

#[derive(Clone, Copy, ValueEnum)]
enum Rule {
    /// Smallest mean CV error
    Min,
    /// Largest penalty within one standard error of the minimum
    #[value(name = "1se")]
    OneSe,
}

#[derive(Clone, Copy, ValueEnum)]
enum Loss {
    /// Mean squared error
    Mse,
    /// Mean absolute error
    Mae,
}

#[derive(Subcommand)]
enum Commands {
    /// Ordinary least squares with coefficient inference
    Ols {
        #[command(flatten)]
        data: DataArgs,

        /// Fit without an intercept
        #[arg(long)]
        no_intercept: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Fit a penalized coefficient path on all observations
    Path {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        model: ModelArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Select the penalty by K-fold cross-validation and refit
    Cv {
        #[command(flatten)]
        data: DataArgs,

        #[command(flatten)]
        model: ModelArgs,

        /// Number of folds
        #[arg(long)]
        folds: Option<usize>,

        /// Selection rule
        #[arg(long, value_enum)]
        rule: Option<Rule>,

        /// Held-out loss
        #[arg(long, value_enum)]
        loss: Option<Loss>,

        /// Event indicator column; the response is then a survival time and
        /// folds are scored by concordance
        #[arg(long)]
        status: Option<String>,

        /// Seed for the fold assignment
        #[arg(long)]
        seed: Option<u64>,

        /// Export the CV curve to a .csv or .json file
        #[arg(long)]
        curve_output: Option<PathBuf>,

        /// Write a JSON report
        #[arg(long)]
        report: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Test every feature for a difference between two sample groups
    De {
        /// Expression CSV: feature names, then one column per sample
        #[arg(long)]
        data: PathBuf,

        /// Group label per sample, comma-separated
        #[arg(long, conflicts_with = "groups_file")]
        groups: Option<String>,

        /// CSV holding one group label per sample
        #[arg(long)]
        groups_file: Option<PathBuf>,

        /// Column of the groups file (default: first column)
        #[arg(long, requires = "groups_file")]
        group_column: Option<String>,

        /// Reference group label
        #[arg(long)]
        reference: Option<String>,

        /// Classical t-test instead of the moderated statistic
        #[arg(long)]
        classical: bool,

        /// Welch variances for the classical t-test
        #[arg(long, requires = "classical")]
        welch: bool,

        /// P-value adjustment (none, bonferroni, holm, BH, BY)
        #[arg(long)]
        adjust: Option<String>,

        /// Rows in the top table
        #[arg(long)]
        top: Option<usize>,

        /// Significance level for adjusted p-values
        #[arg(long)]
        level: Option<f64>,

        /// Take log2(x + offset) before testing
        #[arg(long)]
        log2: Option<f64>,

        /// Write a JSON report
        #[arg(long)]
        report: Option<PathBuf>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Write simulated data sets to CSV
    Simulate {
        #[command(subcommand)]
        kind: SimulateKind,
    },
}

#[derive(Subcommand)]
enum SimulateKind {
    /// Sparse Gaussian linear model
    Regression {
        /// Observations
        #[arg(long, default_value = "100")]
        observations: usize,

        /// Features
        #[arg(long, default_value = "200")]
        features: usize,

        /// Leading non-zero coefficients, comma-separated
        #[arg(long, value_delimiter = ',', allow_hyphen_values = true, default_value = "3,-2,1.5")]
        coefficients: Vec<f64>,

        /// Noise standard deviation
        #[arg(long, default_value = "1.0")]
        noise_sd: f64,

        /// AR(1) correlation between neighbouring features
        #[arg(long, default_value = "0.0")]
        correlation: f64,

        /// RNG seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output CSV
        #[arg(long)]
        output: PathBuf,
    },

    /// Two-group expression experiment
    Expression {
        /// Genes
        #[arg(long, default_value = "1000")]
        features: usize,

        /// Samples per group, as "n0,n1"
        #[arg(long, value_delimiter = ',', num_args = 2, default_value = "5,5")]
        samples: Vec<usize>,

        /// Leading genes with a true group difference
        #[arg(long, default_value = "0")]
        differential: usize,

        /// Mean shift of differential genes
        #[arg(long, default_value = "2.0")]
        effect: f64,

        /// Prior degrees of freedom of gene variances (default: equal variances)
        #[arg(long)]
        prior_df: Option<f64>,

        /// Typical gene variance
        #[arg(long, default_value = "1.0")]
        prior_variance: f64,

        /// RNG seed
        #[arg(long, default_value = "7")]
        seed: u64,

        /// Output expression CSV
        #[arg(long)]
        output: PathBuf,

        /// Output CSV of sample group labels
        #[arg(long)]
        groups_output: PathBuf,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut config = match &cli.config {
        Some(path) => WorkflowConfig::from_file(path)?,
        None => WorkflowConfig::default(),
    };

    match cli.command {
        Commands::Ols {
            data,
            no_intercept,
            output,
        } => run_ols(&data, no_intercept, &output)?,
        Commands::Path { data, model, output } => {
            model.apply(&mut config);
            run_path(&data, config, &output)?;
        }
        Commands::Cv {
            data,
            model,
            folds,
            rule,
            loss,
            status,
            seed,
            curve_output,
            report,
            output,
        } => {
            model.apply(&mut config);
            let cv = &mut config.cross_validation;
            if let Some(folds) = folds {
                cv.folds = folds;
            }
            if let Some(rule) = rule {
                cv.rule = match rule {
                    Rule::Min => SelectionRule::Minimum,
                    Rule::OneSe => SelectionRule::OneStandardError,
                };
            }
            if let Some(loss) = loss {
                cv.loss = match loss {
                    Loss::Mse => ValidationLoss::MeanSquaredError,
                    Loss::Mae => ValidationLoss::MeanAbsoluteError,
                };
            }
            if let Some(seed) = seed {
                cv.seed = seed;
            }
            run_cv(
                &data,
                status.as_deref(),
                config,
                curve_output.as_deref(),
                report.as_deref(),
                &output,
            )?;
        }
        Commands::De {
            data,
            groups,
            groups_file,
            group_column,
            reference,
            classical,
            welch,
            adjust,
            top,
            level,
            log2,
            report,
            output,
        } => {
            let testing = &mut config.testing;
            if classical {
                testing.moderated = false;
            }
            if welch {
                testing.variant = TTestVariant::Welch;
            }
            if let Some(method) = adjust {
                testing.adjustment = method.parse::<AdjustmentMethod>()?;
            }
            if let Some(top) = top {
                testing.top = top;
            }
            if let Some(level) = level {
                testing.level = level;
            }
            if log2.is_some() {
                testing.log2_offset = log2;
            }
            config.validate()?;

            let labels = match (groups, groups_file) {
                (Some(list), _) => parse_group_labels(&list),
                (None, Some(path)) => read_group_labels(&path, group_column.as_deref())?,
                (None, None) => return Err("either --groups or --groups-file is required".into()),
            };
            let set = ExpressionSet::from_csv(&data, &labels, reference.as_deref())?;
            run_de(&set, &data.display().to_string(), &config, report.as_deref(), &output)?;
        }
        Commands::Simulate { kind } => run_simulate(kind)?,
    }

    Ok(())
}

fn run_ols(data: &DataArgs, no_intercept: bool, output: &OutputArgs) -> Result<(), Box<dyn Error>> {
    let design = data.load()?;
    let fit = OrdinaryLeastSquares::new(OlsConfig {
        fit_intercept: !no_intercept,
        ..Default::default()
    })
    .fit(design.x(), design.y())?;

    let table = CoefficientTable::from_ols(design.feature_names(), &fit);
    print_table(&table, output.format, output.step)?;
    if output.format == OutputFormat::Ascii {
        println!(
            "Adjusted R²: {:.4} on {} residual degrees of freedom",
            fit.adj_r_squared, fit.df_residual
        );
    }
    if let Some(path) = &output.output {
        export_table(&table, path)?;
    }
    Ok(())
}

fn run_path(
    data: &DataArgs,
    config: WorkflowConfig,
    output: &OutputArgs,
) -> Result<(), Box<dyn Error>> {
    let design = data.load()?;
    let model = config.model.name();
    let path = RegularizedWorkflow::new(config).fit_path(&design)?;

    let not_converged = path.converged().iter().filter(|&&c| !c).count();
    if not_converged > 0 {
        log::warn!("{not_converged} fit(s) on the path did not converge");
    }

    let summary = PathSummary::new(model, &path);
    print_table(&summary, output.format, output.step)?;
    if let Some(file) = &output.output {
        export_table(&summary, file)?;
    }
    Ok(())
}

fn run_cv(
    data: &DataArgs,
    status: Option<&str>,
    config: WorkflowConfig,
    curve_output: Option<&Path>,
    report: Option<&Path>,
    output: &OutputArgs,
) -> Result<(), Box<dyn Error>> {
    let (design, survival) = match status {
        Some(status) => {
            let (design, response) = load_survival_design(&data.data, &data.response, status)?;
            (design, Some(response))
        }
        None => (data.load()?, None),
    };

    let mut workflow = RegularizedWorkflow::new(config.clone());
    if let Some(response) = &survival {
        workflow = workflow.with_survival(response);
    }

    let pb = ProgressBar::new(config.cross_validation.folds as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("█▓░"),
    );
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Cross-validating {}...", config.model.name()));

    let result = workflow.run_observed(&design, |fold, status| {
        if status == FoldStatus::Skipped {
            pb.println(format!("  fold {} skipped", fold + 1));
        }
        pb.inc(1);
    });
    let outcome = match result {
        Ok(outcome) => {
            pb.finish_with_message(format!("lambda = {:.4e}", outcome.selected_lambda()));
            outcome
        }
        Err(e) => {
            pb.finish_with_message("Failed!");
            return Err(e.into());
        }
    };

    match output.format {
        OutputFormat::Json => {
            let report = outcome.report(&data.dataset(), workflow.config())?;
            println!("{}", report.to_json()?);
        }
        format => {
            if format != OutputFormat::Csv {
                print_table(&outcome.curve, format, output.step)?;
            }
            print_table(&outcome.coefficients, format, output.step)?;
        }
    }

    if let Some(path) = &output.output {
        export_table(&outcome.coefficients, path)?;
    }
    if let Some(path) = curve_output {
        export_table(&outcome.curve, path)?;
    }
    if let Some(path) = report {
        outcome.report(&data.dataset(), workflow.config())?.write(path)?;
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}

fn run_de(
    set: &ExpressionSet,
    dataset: &str,
    config: &WorkflowConfig,
    report: Option<&Path>,
    output: &OutputArgs,
) -> Result<(), Box<dyn Error>> {
    let outcome = DifferentialExpression::new(config.testing.clone()).run(set)?;

    print_table(&outcome.top, output.format, output.step)?;
    if let Some(path) = &output.output {
        export_table(&outcome.top, path)?;
    }
    if let Some(path) = report {
        outcome.report(dataset, config)?.write(path)?;
        eprintln!("Wrote {}", path.display());
    }
    Ok(())
}

fn run_simulate(kind: SimulateKind) -> Result<(), Box<dyn Error>> {
    match kind {
        SimulateKind::Regression {
            observations,
            features,
            coefficients,
            noise_sd,
            correlation,
            seed,
            output,
        } => {
            let model = SparseLinearModel {
                n_observations: observations,
                n_features: features,
                coefficients,
                noise_sd,
                correlation,
                seed,
                ..Default::default()
            };
            let design = model.simulate()?;
            simulate::write_design(&design, &output)?;
            println!(
                "Wrote {} observations x {} features to {} ({} non-zero coefficients)",
                design.n_observations(),
                design.n_features(),
                output.display(),
                model.true_coefficients().iter().filter(|&&b| b != 0.0).count()
            );
        }
        SimulateKind::Expression {
            features,
            samples,
            differential,
            effect,
            prior_df,
            prior_variance,
            seed,
            output,
            groups_output,
        } => {
            let [n0, n1] = samples[..] else {
                return Err("--samples takes two group sizes, e.g. 5,5".into());
            };
            let set = ExpressionSimulation {
                n_features: features,
                samples_per_group: (n0, n1),
                n_differential: differential,
                effect,
                prior_df,
                prior_variance,
                seed,
            }
            .simulate()?;
            simulate::write_expression(&set, &output)?;
            simulate::write_groups(&set, &groups_output)?;
            println!(
                "Wrote {} genes x {} samples to {} and group labels to {}",
                set.n_features(),
                set.n_samples(),
                output.display(),
                groups_output.display()
            );
        }
    }
    Ok(())
}
