//! Instance preparation: the external collaborator that turns a tabular
//! employee-attrition dataset into the fixed retention-project portfolio the
//! solver consumes. The solver never calls into this module directly; it
//! only ever sees the `Vec<Item>` a caller builds from [`retention_portfolio`]
//! or from a prepared CSV file.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::PrepError;
use crate::item::Item;

/// One row of the Kaggle employee-attrition dataset this pipeline was
/// originally built against.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmployeeRecord {
    pub age: Option<f64>,
    pub monthly_income: Option<f64>,
    pub years_at_company: Option<f64>,
    pub distance_from_home: Option<f64>,
    pub number_of_promotions: Option<f64>,
    pub gender: Option<String>,
    pub job_role: Option<String>,
    pub work_life_balance: Option<String>,
    pub job_satisfaction: Option<String>,
    pub performance_rating: Option<String>,
    pub education_level: Option<String>,
    pub marital_status: Option<String>,
    pub attrition: u8,
}

/// What [`clean`] actually changed, surfaced so the CLI driver can report it
/// via `tracing` rather than the library printing narration directly.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleaningReport {
    pub duplicate_rows_removed: usize,
    pub numeric_fills: HashMap<String, f64>,
    pub categorical_fills: HashMap<String, String>,
}

pub fn load_employee_records(path: impl AsRef<Path>) -> Result<Vec<EmployeeRecord>, PrepError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for result in reader.deserialize() {
        records.push(result?);
    }
    Ok(records)
}

/// Drops exact duplicate rows, fills missing numeric cells with the column
/// median and missing categorical cells with the column mode.
pub fn clean(mut records: Vec<EmployeeRecord>) -> (Vec<EmployeeRecord>, CleaningReport) {
    let mut report = CleaningReport::default();

    let before = records.len();
    let mut seen = std::collections::HashSet::new();
    records.retain(|r| seen.insert(serde_json::to_string(r).unwrap_or_default()));
    report.duplicate_rows_removed = before - records.len();

    fill_numeric(&mut records, "age", |r| &mut r.age, &mut report);
    fill_numeric(&mut records, "monthly_income", |r| &mut r.monthly_income, &mut report);
    fill_numeric(&mut records, "years_at_company", |r| &mut r.years_at_company, &mut report);
    fill_numeric(&mut records, "distance_from_home", |r| &mut r.distance_from_home, &mut report);
    fill_numeric(&mut records, "number_of_promotions", |r| &mut r.number_of_promotions, &mut report);

    fill_categorical(&mut records, "gender", |r| &mut r.gender, &mut report);
    fill_categorical(&mut records, "job_role", |r| &mut r.job_role, &mut report);
    fill_categorical(&mut records, "work_life_balance", |r| &mut r.work_life_balance, &mut report);
    fill_categorical(&mut records, "job_satisfaction", |r| &mut r.job_satisfaction, &mut report);
    fill_categorical(&mut records, "performance_rating", |r| &mut r.performance_rating, &mut report);
    fill_categorical(&mut records, "education_level", |r| &mut r.education_level, &mut report);
    fill_categorical(&mut records, "marital_status", |r| &mut r.marital_status, &mut report);

    (records, report)
}

fn fill_numeric(
    records: &mut [EmployeeRecord],
    column: &str,
    field: impl Fn(&mut EmployeeRecord) -> &mut Option<f64>,
    report: &mut CleaningReport,
) {
    let mut present: Vec<f64> = records.iter_mut().filter_map(|r| *field(r)).collect();
    if present.is_empty() || records.iter_mut().all(|r| field(r).is_some()) {
        return;
    }
    present.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let mid = present.len() / 2;
    let median = if present.len() % 2 == 0 {
        (present[mid - 1] + present[mid]) / 2.0
    } else {
        present[mid]
    };

    for record in records.iter_mut() {
        let slot = field(record);
        if slot.is_none() {
            *slot = Some(median);
        }
    }
    report.numeric_fills.insert(column.to_string(), median);
}

fn fill_categorical(
    records: &mut [EmployeeRecord],
    column: &str,
    field: impl Fn(&mut EmployeeRecord) -> &mut Option<String>,
    report: &mut CleaningReport,
) {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for record in records.iter_mut() {
        if let Some(value) = field(record) {
            *counts.entry(value.clone()).or_insert(0) += 1;
        }
    }
    if counts.is_empty() || records.iter_mut().all(|r| field(r).is_some()) {
        return;
    }
    let mode = counts
        .into_iter()
        .max_by_key(|(_, count)| *count)
        .map(|(value, _)| value)
        .unwrap();

    for record in records.iter_mut() {
        let slot = field(record);
        if slot.is_none() {
            *slot = Some(mode.clone());
        }
    }
    report.categorical_fills.insert(column.to_string(), mode);
}

/// Overall and per-category attrition rates, plus numeric-column
/// correlations with the attrition flag.
#[derive(Debug, Clone, Serialize)]
pub struct AttritionSummary {
    pub overall_attrition_rate: f64,
    pub attrition_rate_by_job_satisfaction: HashMap<String, f64>,
    pub attrition_rate_by_work_life_balance: HashMap<String, f64>,
    pub attrition_rate_by_performance_rating: HashMap<String, f64>,
    pub attrition_rate_by_job_role: HashMap<String, f64>,
    pub correlations_with_attrition: HashMap<String, f64>,
}

pub fn summarize(records: &[EmployeeRecord]) -> AttritionSummary {
    let overall_attrition_rate = mean(records, |r| r.attrition as f64);

    AttritionSummary {
        overall_attrition_rate,
        attrition_rate_by_job_satisfaction: rate_by_category(records, |r| r.job_satisfaction.clone()),
        attrition_rate_by_work_life_balance: rate_by_category(records, |r| r.work_life_balance.clone()),
        attrition_rate_by_performance_rating: rate_by_category(records, |r| r.performance_rating.clone()),
        attrition_rate_by_job_role: rate_by_category(records, |r| r.job_role.clone()),
        correlations_with_attrition: [
            ("age", records.iter().filter_map(|r| r.age).collect::<Vec<_>>()),
            (
                "monthly_income",
                records.iter().filter_map(|r| r.monthly_income).collect(),
            ),
            (
                "years_at_company",
                records.iter().filter_map(|r| r.years_at_company).collect(),
            ),
            (
                "distance_from_home",
                records.iter().filter_map(|r| r.distance_from_home).collect(),
            ),
            (
                "number_of_promotions",
                records.iter().filter_map(|r| r.number_of_promotions).collect(),
            ),
        ]
        .into_iter()
        .filter(|(_, values)| values.len() == records.len())
        .map(|(name, values)| {
            let target: Vec<f64> = records.iter().map(|r| r.attrition as f64).collect();
            (name.to_string(), pearson_correlation(&values, &target))
        })
        .collect(),
    }
}

fn mean(records: &[EmployeeRecord], f: impl Fn(&EmployeeRecord) -> f64) -> f64 {
    if records.is_empty() {
        return 0.0;
    }
    records.iter().map(f).sum::<f64>() / records.len() as f64
}

fn rate_by_category(
    records: &[EmployeeRecord],
    field: impl Fn(&EmployeeRecord) -> Option<String>,
) -> HashMap<String, f64> {
    let mut sums: HashMap<String, (f64, usize)> = HashMap::new();
    for record in records {
        if let Some(category) = field(record) {
            let entry = sums.entry(category).or_insert((0.0, 0));
            entry.0 += record.attrition as f64;
            entry.1 += 1;
        }
    }
    sums.into_iter()
        .map(|(category, (sum, count))| (category, sum / count as f64))
        .collect()
}

fn pearson_correlation(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len() as f64;
    if n == 0.0 {
        return 0.0;
    }
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        cov += (x - mean_x) * (y - mean_y);
        var_x += (x - mean_x).powi(2);
        var_y += (y - mean_y).powi(2);
    }

    if var_x == 0.0 || var_y == 0.0 {
        0.0
    } else {
        cov / (var_x.sqrt() * var_y.sqrt())
    }
}

/// Hand-authored justification for one portfolio entry; the solver ignores
/// this, but downstream collaborators (dashboards) read it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Justification {
    pub id: u64,
    pub name: String,
    pub cost: f64,
    pub impact: f64,
    pub category: String,
    pub justification: String,
}

/// The fixed, 15-project HR retention portfolio: costs in thousands of
/// currency units, impact in expected attrition-reduction percentage
/// points. Reproduced from the upstream EDA so the solver and the
/// dashboards agree on a known-answer fixture.
pub fn retention_portfolio() -> Vec<Justification> {
    vec![
        Justification { id: 1, name: "Job Satisfaction Improvement Program".into(), cost: 120.0, impact: 25.0, category: "Engagement".into(), justification: "Job satisfaction is the factor most correlated with attrition".into() },
        Justification { id: 2, name: "Work-Life Balance Initiative".into(), cost: 80.0, impact: 18.0, category: "Wellbeing".into(), justification: "Work-life balance is the second most important factor".into() },
        Justification { id: 3, name: "Career Development Plan".into(), cost: 60.0, impact: 15.0, category: "Development".into(), justification: "Lack of promotions correlates with departures".into() },
        Justification { id: 4, name: "Recognition and Rewards Program".into(), cost: 50.0, impact: 12.0, category: "Recognition".into(), justification: "Low performance ratings raise departure risk".into() },
        Justification { id: 5, name: "Competitive Salary Adjustment".into(), cost: 200.0, impact: 20.0, category: "Compensation".into(), justification: "Monthly income has a moderate correlation with attrition".into() },
        Justification { id: 6, name: "Mentoring and Coaching Program".into(), cost: 40.0, impact: 10.0, category: "Development".into(), justification: "Development support reduces turnover".into() },
        Justification { id: 7, name: "Flexible Scheduling and Remote Work".into(), cost: 30.0, impact: 14.0, category: "Wellbeing".into(), justification: "Distance from home affects the decision to stay".into() },
        Justification { id: 8, name: "Technical Training and Upskilling".into(), cost: 70.0, impact: 13.0, category: "Development".into(), justification: "Investment in skills increases engagement".into() },
        Justification { id: 9, name: "Workplace Environment Improvement".into(), cost: 90.0, impact: 16.0, category: "Infrastructure".into(), justification: "Physical environment influences overall satisfaction".into() },
        Justification { id: 10, name: "Mental Health and Wellbeing Program".into(), cost: 55.0, impact: 11.0, category: "Wellbeing".into(), justification: "Mental health is a critical retention factor".into() },
        Justification { id: 11, name: "Continuous Feedback System".into(), cost: 35.0, impact: 9.0, category: "Communication".into(), justification: "Clear communication reduces dissatisfaction".into() },
        Justification { id: 12, name: "Diversity and Inclusion Program".into(), cost: 65.0, impact: 12.0, category: "Culture".into(), justification: "An inclusive environment increases belonging".into() },
        Justification { id: 13, name: "Personalized Flexible Benefits".into(), cost: 100.0, impact: 17.0, category: "Benefits".into(), justification: "Customized benefits meet individual needs".into() },
        Justification { id: 14, name: "New Employee Onboarding Program".into(), cost: 45.0, impact: 10.0, category: "Onboarding".into(), justification: "New employees have a higher turnover rate".into() },
        Justification { id: 15, name: "Team Building and Culture Initiative".into(), cost: 40.0, impact: 8.0, category: "Culture".into(), justification: "A sense of community increases retention".into() },
    ]
}

/// The portfolio as solver-ready `Item`s, dropping the justification text
/// the solver has no use for.
pub fn retention_items() -> Vec<Item> {
    retention_portfolio()
        .into_iter()
        .map(|project| Item::new(project.id, project.name, project.cost, project.impact, project.category))
        .collect()
}

/// Companion CSV described by the instance file format: header
/// `id,name,cost,impact,category,efficiency`. `efficiency` is informational
/// only; `Instance::new` recomputes it.
pub fn write_portfolio_csv(path: impl AsRef<Path>, items: &[Item]) -> Result<(), PrepError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["id", "name", "cost", "impact", "category", "efficiency"])?;
    for item in items {
        writer.write_record(&[
            item.id.to_string(),
            item.name.clone(),
            item.cost.to_string(),
            item.value.to_string(),
            item.category.clone(),
            item.efficiency().to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

pub fn write_justifications_json(
    path: impl AsRef<Path>,
    justifications: &[Justification],
) -> Result<(), PrepError> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, justifications)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn portfolio_has_fifteen_positive_projects() {
        let items = retention_items();
        assert_eq!(items.len(), 15);
        assert!(items.iter().all(|i| i.cost > 0.0 && i.value > 0.0));
    }

    #[test]
    fn portfolio_totals_match_upstream_figures() {
        let items = retention_items();
        let total_cost: f64 = items.iter().map(|i| i.cost).sum();
        let total_impact: f64 = items.iter().map(|i| i.value).sum();

        assert!((total_cost - 1080.0).abs() < 1e-6);
        assert!((total_impact - 210.0).abs() < 1e-6);
    }

    #[test]
    fn fills_missing_numeric_with_median_and_categorical_with_mode() {
        let records = vec![
            EmployeeRecord {
                age: Some(30.0),
                monthly_income: Some(5000.0),
                years_at_company: Some(2.0),
                distance_from_home: Some(5.0),
                number_of_promotions: Some(1.0),
                gender: Some("F".into()),
                job_role: Some("Engineer".into()),
                work_life_balance: Some("Good".into()),
                job_satisfaction: Some("High".into()),
                performance_rating: Some("High".into()),
                education_level: Some("Bachelor".into()),
                marital_status: Some("Single".into()),
                attrition: 0,
            },
            EmployeeRecord {
                age: None,
                monthly_income: Some(7000.0),
                years_at_company: Some(4.0),
                distance_from_home: Some(10.0),
                number_of_promotions: Some(0.0),
                gender: Some("M".into()),
                job_role: None,
                work_life_balance: Some("Good".into()),
                job_satisfaction: Some("Low".into()),
                performance_rating: Some("Average".into()),
                education_level: Some("Master".into()),
                marital_status: Some("Married".into()),
                attrition: 1,
            },
        ];

        let (cleaned, report) = clean(records);
        assert!(cleaned.iter().all(|r| r.age.is_some()));
        assert_eq!(report.numeric_fills.get("age"), Some(&30.0));
        assert_eq!(
            cleaned.iter().filter(|r| r.job_role.is_none()).count(),
            0
        );
    }
}
