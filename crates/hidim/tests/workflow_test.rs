//! End-to-end workflow tests on simulated data.

use approx::assert_abs_diff_eq;
use hidim::data::{ExpressionSimulation, SparseLinearModel, SurvivalResponse};
use hidim::output::{ExportFormat, Exporter};
use hidim::penalized::{FoldStatus, SelectionRule};
use hidim::{
    DifferentialExpression, ModelConfig, RegularizedWorkflow, TestingConfig, WorkflowConfig,
};

fn lasso_config(rule: SelectionRule) -> WorkflowConfig {
    let mut config = WorkflowConfig::default();
    config.cross_validation.folds = 5;
    config.cross_validation.rule = rule;
    config
}

#[test]
fn test_lasso_workflow_recovers_support() {
    let model = SparseLinearModel {
        n_observations: 80,
        n_features: 40,
        coefficients: vec![3.0, -2.5, 2.0],
        ..Default::default()
    };
    let design = model.simulate().unwrap();

    let mut scored = 0;
    let outcome = RegularizedWorkflow::new(lasso_config(SelectionRule::OneStandardError))
        .run_observed(&design, |_, status| {
            if status == FoldStatus::Scored {
                scored += 1;
            }
        })
        .unwrap();

    assert_eq!(scored, 5);
    assert_eq!(outcome.model, "lasso");
    assert!(outcome.cv.lambda_1se() >= outcome.cv.lambda_min());

    let beta = outcome.selected_coefficients();
    assert!(beta[0] > 1.5 && beta[1] < -1.0 && beta[2] > 1.0);
    let terms: Vec<&str> = outcome.coefficients.rows.iter().map(|r| r.term.as_str()).collect();
    assert!(terms.contains(&"x1") && terms.contains(&"x2") && terms.contains(&"x3"));
    assert!(outcome.coefficients.rows.len() < 20);

    let predicted = outcome.predict(design.x()).unwrap();
    assert_eq!(predicted.len(), design.n_observations());
}

#[test]
fn test_ridge_workflow_keeps_every_feature() {
    let design = SparseLinearModel::default().simulate().unwrap();
    let config = WorkflowConfig {
        model: ModelConfig {
            alpha: 0.0,
            ..Default::default()
        },
        ..lasso_config(SelectionRule::Minimum)
    };

    let workflow = RegularizedWorkflow::new(config);
    let outcome = workflow.run(&design).unwrap();

    assert_eq!(outcome.model, "ridge");
    assert_eq!(outcome.coefficients.rows.len(), design.n_features() + 1);
    assert_eq!(outcome.selected_index(), outcome.cv.index_min);

    let path = workflow.fit_path(&design).unwrap();
    assert_eq!(path.len(), 100);
}

#[test]
fn test_workflow_report_and_exports() {
    let design = SparseLinearModel {
        n_observations: 40,
        n_features: 10,
        ..Default::default()
    }
    .simulate()
    .unwrap();
    let config = lasso_config(SelectionRule::Minimum);
    let outcome = RegularizedWorkflow::new(config.clone()).run(&design).unwrap();

    let report = outcome.report("simulated", &config).unwrap();
    let json = report.to_json().unwrap();
    assert!(json.contains("\"cv_curve\""));
    assert!(json.contains("\"dataset\": \"simulated\""));

    let csv = outcome.curve.export_to_string(ExportFormat::Csv).unwrap();
    assert_eq!(csv.lines().count(), outcome.cv.lambdas.len() + 1);
}

#[test]
fn test_concordance_loss_with_survival_response() {
    let design = SparseLinearModel {
        n_observations: 60,
        n_features: 8,
        coefficients: vec![2.0, 1.0],
        intercept: 20.0,
        ..Default::default()
    }
    .simulate()
    .unwrap();
    let events: Vec<bool> = (0..60).map(|i| i % 4 != 0).collect();
    let response = SurvivalResponse::new(design.y().clone(), events).unwrap();

    let outcome = RegularizedWorkflow::new(lasso_config(SelectionRule::Minimum))
        .with_survival(&response)
        .run(&design)
        .unwrap();

    assert_eq!(outcome.curve.loss, "1-C");
    let best = outcome.cv.mean_error[outcome.cv.index_min];
    assert!(best < 0.3, "1 - C = {best}");
}

#[test]
fn test_differential_expression_moderated_and_classical() {
    let set = ExpressionSimulation {
        n_features: 500,
        samples_per_group: (4, 4),
        n_differential: 50,
        effect: 3.0,
        prior_df: Some(4.0),
        prior_variance: 0.5,
        seed: 11,
    }
    .simulate()
    .unwrap();

    let moderated = DifferentialExpression::new(TestingConfig::default()).run(&set).unwrap();
    assert!(moderated.prior.is_some());
    assert_eq!(moderated.top.rows.len(), 20);
    assert_eq!(moderated.top.n_tested, 500);
    assert!(moderated.top.n_significant >= 20);

    let classical = DifferentialExpression::new(TestingConfig {
        moderated: false,
        ..Default::default()
    })
    .run(&set)
    .unwrap();
    assert!(classical.prior.is_none());
    assert_abs_diff_eq!(classical.table.rows()[0].df, 6.0);

    let report = moderated.report("simulated", &WorkflowConfig::default()).unwrap();
    assert!(report.to_json().unwrap().contains("\"top_table\""));
}

#[test]
fn test_differential_expression_log2_transform() {
    let set = ExpressionSimulation {
        n_features: 200,
        ..Default::default()
    }
    .simulate()
    .unwrap();
    let positive = hidim::data::ExpressionSet::new(
        set.values().mapv(|v| 2f64.powf(v + 8.0)),
        set.feature_names().to_vec(),
        &set.groups()
            .iter()
            .map(|&g| set.group_labels()[g].clone())
            .collect::<Vec<_>>(),
        Some("control"),
    )
    .unwrap();

    let config = TestingConfig {
        log2_offset: Some(0.0),
        ..Default::default()
    };
    let raw = DifferentialExpression::default().run(&set).unwrap();
    let transformed = DifferentialExpression::new(config).run(&positive).unwrap();

    let effect = |table: &hidim::testing::TestTable, name: &str| {
        table.rows().iter().find(|r| r.feature == name).map(|r| r.effect).unwrap()
    };
    assert_abs_diff_eq!(
        effect(&raw.table, "gene1"),
        effect(&transformed.table, "gene1"),
        epsilon = 1e-9
    );
}
