//! Instruction template sent ahead of every question.

/// Returns the fixed instructions that tell the model how to answer.
///
/// The template names the `STUDENT` table and its columns, gives two worked
/// examples, and asks for a bare statement with no code fences and no
/// leading "SQL" label, since the reply is executed exactly as returned.
pub fn instruction_template() -> &'static str {
    "You are an expert in converting English questions into SQL queries!\n\
     The SQL database has a single table named `STUDENT` with the following columns: \
     `STUDENT_ID`, `NAME`, `CLASS`, `SECTION`, and `MARKS` (an integer from 0 to 100).\n\n\
     Examples:\n\
     1. Question: \"How many entries of records are present?\"\n   \
        SQL Query: SELECT COUNT(*) FROM STUDENT;\n\n\
     2. Question: \"How many students study in the Data Science class?\"\n   \
        SQL Query: SELECT * FROM STUDENT WHERE CLASS = 'Data Science';\n\n\
     Important Notes:\n\
     - Do not include backticks or triple backticks (` ``` `) around the query.\n\
     - Do not include the word \"SQL\" in the output."
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_names_table_and_columns() {
        let template = instruction_template();
        assert!(template.contains("`STUDENT`"));
        for column in ["STUDENT_ID", "NAME", "CLASS", "SECTION", "MARKS"] {
            assert!(template.contains(column), "missing column {column}");
        }
    }

    #[test]
    fn test_template_forbids_fences_and_label() {
        let template = instruction_template();
        assert!(template.contains("Do not include backticks"));
        assert!(template.contains("Do not include the word \"SQL\""));
    }

    #[test]
    fn test_template_has_examples() {
        let template = instruction_template();
        assert!(template.contains("SELECT COUNT(*) FROM STUDENT;"));
        assert!(template.contains("WHERE CLASS = 'Data Science'"));
    }
}
