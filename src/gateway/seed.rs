//! Synthetic fixture data written by `GET /init`.

use mongodb::bson::{Document, doc, oid::ObjectId};

/// Number of exams and of students inserted by a seed run.
pub const SEED_SIZE: usize = 50;

/// Build the synthetic exams.
///
/// For `i` in `1..=50`: `type` cycles `exam0..exam9`, `specialty` cycles `spec0..spec4`, and
/// `date` walks the days of October 2025 without zero padding (`2025-10-2` .. `2025-10-28`,
/// then `2025-10-1`).
pub fn synthetic_exams() -> Vec<Document> {
    (1..=SEED_SIZE)
        .map(|i| {
            doc! {
                "type": format!("exam{}", i % 10),
                "specialty": format!("spec{}", i % 5),
                "date": format!("2025-10-{}", (i % 28) + 1),
            }
        })
        .collect()
}

/// Build one synthetic student per exam identifier, the i-th student referencing the i-th exam.
pub fn synthetic_students(exam_ids: &[ObjectId]) -> Vec<Document> {
    exam_ids
        .iter()
        .enumerate()
        .map(|(index, exam_id)| {
            let i = index + 1;
            let age = 18 + (i % 10) as i32;
            doc! {
                "name": format!("Student{i}"),
                "age": age,
                "exam_id": *exam_id,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exams_cycle_types_specialties_and_dates() {
        let exams = synthetic_exams();
        assert_eq!(exams.len(), SEED_SIZE);

        let first = &exams[0];
        assert_eq!(first.get_str("type").expect("type"), "exam1");
        assert_eq!(first.get_str("specialty").expect("specialty"), "spec1");
        assert_eq!(first.get_str("date").expect("date"), "2025-10-2");

        let tenth = &exams[9];
        assert_eq!(tenth.get_str("type").expect("type"), "exam0");

        let twenty_eighth = &exams[27];
        assert_eq!(twenty_eighth.get_str("date").expect("date"), "2025-10-1");

        for exam in &exams {
            let kind = exam.get_str("type").expect("type");
            assert!(kind.starts_with("exam") && kind.len() == 5, "{kind}");
        }
    }

    #[test]
    fn students_reference_exams_positionally() {
        let exam_ids: Vec<ObjectId> = (0..SEED_SIZE).map(|_| ObjectId::new()).collect();
        let students = synthetic_students(&exam_ids);
        assert_eq!(students.len(), SEED_SIZE);

        for (index, student) in students.iter().enumerate() {
            assert_eq!(
                student.get_object_id("exam_id").expect("exam_id"),
                exam_ids[index]
            );
            let age = student.get_i32("age").expect("age");
            assert!((18..=27).contains(&age));
        }
        assert_eq!(students[0].get_str("name").expect("name"), "Student1");
        assert_eq!(students[0].get_i32("age").expect("age"), 19);
        assert_eq!(students[9].get_i32("age").expect("age"), 18);
    }
}
