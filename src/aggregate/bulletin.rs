#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

use serde::Serialize;

use super::{AggregateError, Avg, NotesTable};
use crate::model::{
    FormSemestre, SemestreId, StudentId,
    note::{fmt_average, fmt_value},
};

/// One evaluation line of a bulletin module.
#[derive(Debug, Clone, Serialize)]
pub struct BulletinEvaluation {
    /// Description shown to the student.
    pub description: String,
    /// ISO date of the evaluation.
    pub date:        String,
    /// Weight in the module average.
    pub coefficient: f64,
    /// The student's note, rescaled to /20 and formatted ("12.00",
    /// "ABS", ...). `"-"` when no note was entered.
    pub note:        String,
    /// Class mean over the evaluation's numeric notes, /20.
    pub class_mean:  String,
}

/// One module block of a bulletin UE.
#[derive(Debug, Clone, Serialize)]
pub struct BulletinModule {
    /// Module code.
    pub code:        String,
    /// Module title.
    pub title:       String,
    /// Weight in the UE average.
    pub coefficient: f64,
    /// The student's module average, formatted.
    pub average:     String,
    /// Rank in the module, with the ranked head count.
    pub rank:        String,
    /// Ranked students in the module.
    pub ranked:      usize,
    /// Valid evaluations of the module, oldest first.
    pub evaluations: Vec<BulletinEvaluation>,
}

/// One UE block of a bulletin.
#[derive(Debug, Clone, Serialize)]
pub struct BulletinUe {
    /// UE acronym.
    pub acronym:     String,
    /// UE title.
    pub title:       String,
    /// Weight of the UE in the student's general average.
    pub coefficient: f64,
    /// The student's UE average, formatted.
    pub average:     String,
    /// Rank in the UE.
    pub rank:        String,
    /// Students ranked in the UE.
    pub ranked:      usize,
    /// Modules the student is enrolled in.
    pub modules:     Vec<BulletinModule>,
}

/// A student's grade report for one semester.
#[derive(Debug, Clone, Serialize)]
pub struct Bulletin {
    /// Student the bulletin belongs to.
    pub student_id:     StudentId,
    /// Full display name.
    pub name:           String,
    /// Semester the bulletin covers.
    pub semestre_id:    SemestreId,
    /// Semester title.
    pub semestre_title: String,
    /// General average, formatted.
    pub general:        String,
    /// Rank over the general average.
    pub rank:           String,
    /// Cohort size.
    pub cohort:         usize,
    /// Class mean of general averages, formatted.
    pub class_mean:     String,
    /// UEs the student is enrolled in, in semester order.
    pub ues:            Vec<BulletinUe>,
    /// True when some of the student's modules still await grades.
    pub pending:        bool,
}

impl Bulletin {
    /// Assembles the report of one student from a computed table.
    ///
    /// UEs where the student is enrolled in no module are left out, as
    /// are modules outside the student's roster.
    pub fn build(
        semestre: &FormSemestre,
        table: &NotesTable,
        student_id: StudentId,
    ) -> Result<Self, AggregateError> {
        let student = semestre
            .student(student_id)
            .ok_or(AggregateError::UnknownStudent {
                student_id,
                semestre_id: semestre.id,
            })?;

        let mut ues = Vec::new();
        for ue in semestre.ues_ordered() {
            let ue_avg = table.ue_average(ue.id, student_id);
            if ue_avg == Avg::NotEnrolled {
                continue;
            }

            let mut modules = Vec::new();
            for module in semestre.modules_of_ue(ue.id) {
                let averages = &table.module_averages[&module.id];
                let avg = averages.average_for(student_id);
                if avg == Avg::NotEnrolled {
                    continue;
                }

                let evaluations = averages
                    .valid_evaluations
                    .iter()
                    .filter_map(|eid| semestre.evaluation(*eid))
                    .map(|(_, evaluation)| {
                        let note = evaluation
                            .note_for(student_id)
                            .map(|n| match n.scaled(evaluation.out_of) {
                                Some(v) => fmt_value(v),
                                None => n.to_string(),
                            })
                            .unwrap_or_else(|| "-".to_string());
                        let scaled: Vec<f64> = evaluation
                            .notes
                            .values()
                            .filter_map(|n| n.scaled(evaluation.out_of))
                            .collect();
                        let mean = (!scaled.is_empty())
                            .then(|| scaled.iter().sum::<f64>() / scaled.len() as f64);
                        BulletinEvaluation {
                            description: evaluation.description.clone(),
                            date:        evaluation.date.clone(),
                            coefficient: evaluation.coefficient,
                            note,
                            class_mean:  fmt_average(mean),
                        }
                    })
                    .collect();

                let (module_ranks, ranked) = &table.module_ranks[&module.id];
                modules.push(BulletinModule {
                    code:        module.code.clone(),
                    title:       module.title.clone(),
                    coefficient: module.coefficient,
                    average:     avg.to_display(),
                    rank:        module_ranks.get(&student_id).cloned().unwrap_or_default(),
                    ranked:      *ranked,
                    evaluations,
                });
            }

            let (ue_ranks, ranked) = &table.ue_ranks[&ue.id];
            let coefficient = table.ue_status[&student_id][&ue.id].coefficient;
            ues.push(BulletinUe {
                acronym: ue.acronym.clone(),
                title: ue.title.clone(),
                coefficient,
                average: ue_avg.to_display(),
                rank: ue_ranks.get(&student_id).cloned().unwrap_or_default(),
                ranked: *ranked,
                modules,
            });
        }

        let pending = table.modules_pending.iter().any(|module_id| {
            table.module_averages[module_id]
                .per_student
                .contains_key(&student_id)
        });

        Ok(Self {
            student_id,
            name: student.full_name(),
            semestre_id: semestre.id,
            semestre_title: semestre.title.clone(),
            general: table.general_average(student_id).to_display(),
            rank: table.rank_of(student_id).unwrap_or_default().to_string(),
            cohort: table.cohort,
            class_mean: fmt_average(table.general_stats.mean),
            ues,
            pending,
        })
    }
}
