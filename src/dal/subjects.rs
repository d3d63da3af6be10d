use super::models::Subject;
use super::Dal;

impl Dal {
    /// Subjects for the session form's dropdown. Subjects are maintained
    /// outside this layer.
    pub fn fetch_subjects(&self) -> Vec<Subject> {
        self.read("subjects.fetch", |conn| {
            let mut stmt = conn.prepare(
                "SELECT subject_id, subject_name FROM Subject ORDER BY subject_name",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(Subject {
                        subject_id: row.get(0)?,
                        subject_name: row.get(1)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}
