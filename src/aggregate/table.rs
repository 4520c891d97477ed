#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use std::{collections::HashMap, time::Instant};

use bon::Builder;
use itertools::Itertools;
use serde::Serialize;
use tabled::{builder::Builder as TableBuilder, settings::Style};
use tracing::info;

use super::{
    AggregateError, Avg, Diagnostic,
    moduleimpl::{ModuleAverages, compute_module_averages},
    ranks::{compute_ranks, sort_by_average_desc},
};
use crate::model::{
    EvaluationId, FormSemestre, ModuleImpl, ModuleImplId, SemestreId, StudentId, Ue, UeId,
    note::fmt_average,
};

/// Computation options for a semester.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder, Serialize)]
pub struct Options {
    /// Weight UEs by their declared coefficient instead of the sum of
    /// their module coefficients.
    #[builder(default)]
    pub use_ue_coefs: bool,
}

/// Standing of one student in one UE.
#[derive(Debug, Clone, Serialize)]
pub struct UeStatus {
    /// Weighted average over the UE's modules.
    pub average:     Avg,
    /// Weight this UE carries in the student's general average.
    pub coefficient: f64,
    /// Modules that contributed a numeric average.
    pub counted:     usize,
    /// Enrolled modules without a numeric average.
    pub missing:     usize,
}

/// Mean, extrema and head count over the students holding a numeric value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ClassStats {
    /// Arithmetic mean, when at least one value exists.
    pub mean:  Option<f64>,
    /// Lowest value.
    pub min:   Option<f64>,
    /// Highest value.
    pub max:   Option<f64>,
    /// Number of numeric values.
    pub count: usize,
}

impl ClassStats {
    /// Collects statistics from an iterator of average slots.
    fn collect(values: impl Iterator<Item = Avg>) -> Self {
        let values: Vec<f64> = values.filter_map(Avg::value).collect();
        if values.is_empty() {
            return Self::default();
        }
        let sum: f64 = values.iter().sum();
        Self {
            mean:  Some(sum / values.len() as f64),
            min:   values.iter().copied().reduce(f64::min),
            max:   values.iter().copied().reduce(f64::max),
            count: values.len(),
        }
    }
}

/// One row of the sorted table: a student and their computed averages in
/// column order.
#[derive(Debug, Clone, Serialize)]
pub struct Row {
    /// Student this row belongs to.
    pub student_id: StudentId,
    /// General (semester) average.
    pub general:    Avg,
    /// Per-UE averages, in UE order.
    pub ues:        Vec<Avg>,
    /// Per-module averages, in table column order.
    pub modules:    Vec<Avg>,
}

/// The computed grade table of one semester.
///
/// Columns are modules, rows are students; built bottom-up (evaluation →
/// module → UE → semester) and sorted by descending general average.
#[derive(Debug, Serialize)]
pub struct NotesTable {
    /// Semester the table was computed for.
    pub semestre_id: SemestreId,
    /// Cohort size (all inscriptions).
    pub cohort: usize,
    /// Rows sorted by descending general average, students without one
    /// last in alphabetical order.
    pub rows: Vec<Row>,
    /// Rank string per student, over the general average.
    pub ranks: HashMap<StudentId, String>,
    /// Per-UE rank strings and the count of ranked students.
    pub ue_ranks: HashMap<UeId, (HashMap<StudentId, String>, usize)>,
    /// Per-module rank strings and the count of ranked students.
    pub module_ranks: HashMap<ModuleImplId, (HashMap<StudentId, String>, usize)>,
    /// Per-module averages and evaluation bookkeeping.
    pub module_averages: HashMap<ModuleImplId, ModuleAverages>,
    /// Per-student UE standings.
    pub ue_status: HashMap<StudentId, HashMap<UeId, UeStatus>>,
    /// General average per student.
    pub general: HashMap<StudentId, Avg>,
    /// Class statistics per module.
    pub module_stats: HashMap<ModuleImplId, ClassStats>,
    /// Class statistics per UE.
    pub ue_stats: HashMap<UeId, ClassStats>,
    /// Class statistics over general averages.
    pub general_stats: ClassStats,
    /// Modules holding grades still awaited.
    pub modules_pending: Vec<ModuleImplId>,
    /// Findings collected during the computation.
    pub diagnostics: Vec<Diagnostic>,
}

impl NotesTable {
    /// Builds the full table for a semester.
    ///
    /// Errors with [`AggregateError::NoEvaluations`] when the semester
    /// holds no evaluation at all.
    pub fn compute(semestre: &FormSemestre, options: &Options) -> Result<Self, AggregateError> {
        if semestre.has_no_evaluations() {
            return Err(AggregateError::NoEvaluations {
                semestre_id: semestre.id,
            });
        }
        let started = Instant::now();

        // evaluation -> module
        let mut module_averages = HashMap::new();
        let mut modules_pending = Vec::new();
        let mut diagnostics = Vec::new();
        for module in &semestre.modules {
            let averages = compute_module_averages(semestre, module);
            if averages.pending {
                modules_pending.push(module.id);
            }
            diagnostics.extend(averages.diagnostics.iter().cloned());
            module_averages.insert(module.id, averages);
        }

        // module -> UE -> semester
        let students = semestre.students_sorted();
        let alpha_rank: HashMap<StudentId, usize> =
            students.iter().enumerate().map(|(i, s)| (s.id, i)).collect();

        let ues = semestre.ues_ordered();
        let module_columns = semestre.modules_ordered();

        let mut ue_status: HashMap<StudentId, HashMap<UeId, UeStatus>> = HashMap::new();
        let mut general: HashMap<StudentId, Avg> = HashMap::new();
        for student in &students {
            let mut per_ue = HashMap::new();
            let mut sum_avg = 0.0;
            let mut sum_coefs = 0.0;
            for ue in &ues {
                let status = ue_average(semestre, &module_averages, ue, student.id, options);
                if let Avg::Value(v) = status.average {
                    sum_avg += v * status.coefficient;
                    sum_coefs += status.coefficient;
                }
                per_ue.insert(ue.id, status);
            }
            let overall = if sum_coefs > 0.0 {
                Avg::Value(sum_avg / sum_coefs)
            } else {
                Avg::Missing
            };
            general.insert(student.id, overall);
            ue_status.insert(student.id, per_ue);
        }

        // sorted rows and ranks
        let mut order: Vec<(Option<f64>, StudentId)> = students
            .iter()
            .map(|s| (general[&s.id].value(), s.id))
            .collect();
        sort_by_average_desc(&mut order, &alpha_rank);
        let ranks = compute_ranks(&order);

        let rows = order
            .iter()
            .map(|(_, student)| Row {
                student_id: *student,
                general:    general[student],
                ues:        ues
                    .iter()
                    .map(|ue| ue_status[student][&ue.id].average)
                    .collect(),
                modules:    module_columns
                    .iter()
                    .map(|m| module_averages[&m.id].average_for(*student))
                    .collect(),
            })
            .collect();

        let ue_ranks = ues
            .iter()
            .map(|ue| {
                let mut vals: Vec<(Option<f64>, StudentId)> = students
                    .iter()
                    .map(|s| (ue_status[&s.id][&ue.id].average.value(), s.id))
                    .collect();
                let ranked = vals.iter().filter(|(avg, _)| avg.is_some()).count();
                sort_by_average_desc(&mut vals, &alpha_rank);
                (ue.id, (compute_ranks(&vals), ranked))
            })
            .collect();

        let module_ranks = semestre
            .modules
            .iter()
            .map(|module| {
                let averages = &module_averages[&module.id];
                let mut vals: Vec<(Option<f64>, StudentId)> = averages
                    .per_student
                    .keys()
                    .sorted()
                    .map(|s| (averages.per_student[s].value(), *s))
                    .collect();
                sort_by_average_desc(&mut vals, &alpha_rank);
                let count = vals.len();
                (module.id, (compute_ranks(&vals), count))
            })
            .collect();

        // class statistics
        let module_stats = semestre
            .modules
            .iter()
            .map(|module| {
                let averages = &module_averages[&module.id];
                (
                    module.id,
                    ClassStats::collect(averages.per_student.values().copied()),
                )
            })
            .collect();
        let ue_stats = ues
            .iter()
            .map(|ue| {
                (
                    ue.id,
                    ClassStats::collect(
                        students.iter().map(|s| ue_status[&s.id][&ue.id].average),
                    ),
                )
            })
            .collect();
        let general_stats = ClassStats::collect(general.values().copied());

        let table = Self {
            semestre_id: semestre.id,
            cohort: students.len(),
            rows,
            ranks,
            ue_ranks,
            module_ranks,
            module_averages,
            ue_status,
            general,
            module_stats,
            ue_stats,
            general_stats,
            modules_pending,
            diagnostics,
        };
        info!(
            semestre_id = %semestre.id,
            students = table.cohort,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "notes table computed"
        );
        Ok(table)
    }

    /// Average of a student in a module.
    pub fn module_average(&self, module: ModuleImplId, student: StudentId) -> Avg {
        self.module_averages
            .get(&module)
            .map(|m| m.average_for(student))
            .unwrap_or(Avg::NotEnrolled)
    }

    /// Average of a student in a UE.
    pub fn ue_average(&self, ue: UeId, student: StudentId) -> Avg {
        self.ue_status
            .get(&student)
            .and_then(|per_ue| per_ue.get(&ue))
            .map(|status| status.average)
            .unwrap_or(Avg::NotEnrolled)
    }

    /// General average of a student.
    pub fn general_average(&self, student: StudentId) -> Avg {
        self.general.get(&student).copied().unwrap_or(Avg::NotEnrolled)
    }

    /// Student ids sorted by descending general average.
    pub fn students_ranked(&self) -> Vec<StudentId> {
        self.rows.iter().map(|row| row.student_id).collect()
    }

    /// Rank string of a student over the general average.
    pub fn rank_of(&self, student: StudentId) -> Option<&str> {
        self.ranks.get(&student).map(String::as_str)
    }

    /// Ids of the evaluations that entered a module's averages.
    pub fn valid_evaluations(&self, module: ModuleImplId) -> &[EvaluationId] {
        self.module_averages
            .get(&module)
            .map(|m| m.valid_evaluations.as_slice())
            .unwrap_or(&[])
    }

    /// Renders the sorted table for terminal display: one row per
    /// student, one column per UE and per module.
    pub fn recap(&self, semestre: &FormSemestre) -> tabled::Table {
        let ues = semestre.ues_ordered();
        let modules = semestre.modules_ordered();

        let mut builder = TableBuilder::default();
        let mut header = vec!["Rank".to_string(), "Student".to_string(), "Avg".to_string()];
        header.extend(ues.iter().map(|ue| ue.acronym.clone()));
        header.extend(modules.iter().map(|m| m.code.clone()));
        builder.push_record(header);

        for row in &self.rows {
            let name = semestre
                .student(row.student_id)
                .map(|s| s.short_name())
                .unwrap_or_else(|| row.student_id.to_string());
            let mut record = vec![
                self.ranks.get(&row.student_id).cloned().unwrap_or_default(),
                name,
                row.general.to_display(),
            ];
            record.extend(row.ues.iter().map(|avg| avg.to_display()));
            record.extend(row.modules.iter().map(|avg| avg.to_display()));
            builder.push_record(record);
        }

        let mut footer = vec![
            String::new(),
            "class mean".to_string(),
            fmt_average(self.general_stats.mean),
        ];
        footer.extend(ues.iter().map(|ue| fmt_average(self.ue_stats[&ue.id].mean)));
        footer.extend(
            modules
                .iter()
                .map(|m| fmt_average(self.module_stats[&m.id].mean)),
        );
        builder.push_record(footer);

        let mut table = builder.build();
        table.with(Style::modern());
        table
    }
}

/// Weighted mean of a student's module averages inside one UE.
fn ue_average(
    semestre: &FormSemestre,
    module_averages: &HashMap<ModuleImplId, ModuleAverages>,
    ue: &Ue,
    student: StudentId,
    options: &Options,
) -> UeStatus {
    let modules: Vec<&ModuleImpl> = semestre.modules_of_ue(ue.id);
    let mut sum_notes = 0.0;
    let mut sum_coefs = 0.0;
    let mut counted = 0;
    let mut missing = 0;
    let mut enrolled = false;
    for module in &modules {
        match module_averages[&module.id].average_for(student) {
            Avg::Value(v) => {
                enrolled = true;
                sum_notes += v * module.coefficient;
                sum_coefs += module.coefficient;
                counted += 1;
            }
            Avg::Missing => {
                enrolled = true;
                missing += 1;
            }
            Avg::NotEnrolled => {}
        }
    }

    let average = if sum_coefs > 0.0 {
        Avg::Value(sum_notes / sum_coefs)
    } else if enrolled {
        Avg::Missing
    } else {
        Avg::NotEnrolled
    };

    // weight of the UE in the general average: the coefficients actually
    // counted, or the declared UE coefficient when requested
    let coefficient = match (options.use_ue_coefs, ue.coefficient) {
        (true, Some(declared)) => declared,
        _ => sum_coefs,
    };

    UeStatus {
        average,
        coefficient,
        counted,
        missing,
    }
}
