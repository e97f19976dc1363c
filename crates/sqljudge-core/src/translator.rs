use crate::model::{ErrorKind, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    #[default]
    En,
    Nl,
}

/// Every user-facing text the judge can emit, with its parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Text {
    AddASemicolon,
    InvalidSingleQuoteTableName { table: String },
    SubmissionWrongQueryType { submitted: String },
    SubmissionForbiddenSymbolRegex { value: String },
    SubmissionMandatorySymbolRegex { value: String },
    SubmissionForbiddenFullRegex { value: String },
    SubmissionMandatoryFullRegex { value: String },
    SubmissionContainsMoreQueries { submitted: usize, expected: usize },
    SubmissionContainsLessQueries { submitted: usize, expected: usize },
    DifferentRowCount { expected: usize, submitted: usize },
    DifferentColumnCount { expected: usize, submitted: usize },
    ComparingQueryOutputCsvContent,
    ComparingQueryOutputTypes,
    QueryShouldOrderRows,
    QueryShouldNotOrderRows,
    RowsAreBeingOrdered,
    RowsAreNotBeingOrdered,
    CorrectRowsWrongOrder,
    ComparingTableLayout { table: String },
    ComparingTableContent { table: String },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Translator {
    language: Language,
}

impl Translator {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    /// Unknown or unsupported languages fall back to English.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "nl" => Self::new(Language::Nl),
            _ => Self::new(Language::En),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn status(&self, kind: ErrorKind) -> Status {
        Status {
            kind,
            human: self.human_error(kind).to_string(),
        }
    }

    pub fn human_error(&self, kind: ErrorKind) -> &'static str {
        match self.language {
            Language::En => match kind {
                ErrorKind::InternalError => "Internal error",
                ErrorKind::CompilationError => "The query is not valid",
                ErrorKind::MemoryLimitExceeded => "Memory limit exceeded",
                ErrorKind::TimeLimitExceeded => "Time limit exceeded",
                ErrorKind::OutputLimitExceeded => "Output limit exceeded",
                ErrorKind::RuntimeError => "Crashed while testing",
                ErrorKind::Wrong => "Test failed",
                ErrorKind::Correct => "All tests succeeded",
            },
            Language::Nl => match kind {
                ErrorKind::InternalError => "Interne fout",
                ErrorKind::CompilationError => "Ongeldige query",
                ErrorKind::MemoryLimitExceeded => "Geheugenlimiet overschreden",
                ErrorKind::TimeLimitExceeded => "Tijdslimiet overschreden",
                ErrorKind::OutputLimitExceeded => "Outputlimiet overschreden",
                ErrorKind::RuntimeError => "Gecrasht bij testen",
                ErrorKind::Wrong => "Test gefaald",
                ErrorKind::Correct => "Alle testen geslaagd",
            },
        }
    }

    pub fn translate(&self, text: &Text) -> String {
        match self.language {
            Language::En => english(text),
            Language::Nl => dutch(text),
        }
    }
}

fn english(text: &Text) -> String {
    match text {
        Text::AddASemicolon => "Add a semicolon ';' at the end of each SQL query.".into(),
        Text::InvalidSingleQuoteTableName { table } => format!(
            "Error: The database contains a tablename ({table}) containing a single quote."
        ),
        Text::SubmissionWrongQueryType { submitted } => format!(
            "Error: the submitted query is of a different type ({submitted}) than expected."
        ),
        Text::SubmissionForbiddenSymbolRegex { value } => {
            format!("Error: the submitted query should not contain `{value}`.")
        }
        Text::SubmissionMandatorySymbolRegex { value } => {
            format!("Error: the submitted query should contain `{value}`.")
        }
        Text::SubmissionForbiddenFullRegex { value } => {
            format!("Error: the submitted query should not match `{value}`.")
        }
        Text::SubmissionMandatoryFullRegex { value } => {
            format!("Error: the submitted query should match `{value}`.")
        }
        Text::SubmissionContainsMoreQueries {
            submitted,
            expected,
        } => format!(
            "Error: the submitted solution contains more queries ({submitted}) than expected ({expected}). \
             Make sure that all queries correctly terminate with a semicolon."
        ),
        Text::SubmissionContainsLessQueries {
            submitted,
            expected,
        } => format!(
            "Error: the submitted solution contains less queries ({submitted}) than expected ({expected}). \
             Make sure that all queries correctly terminate with a semicolon."
        ),
        Text::DifferentRowCount {
            expected,
            submitted,
        } => format!("Expected row count {expected}, your row count was {submitted}."),
        Text::DifferentColumnCount {
            expected,
            submitted,
        } => format!("Expected column count {expected}, your column count was {submitted}."),
        Text::ComparingQueryOutputCsvContent => "Comparing query output csv content".into(),
        Text::ComparingQueryOutputTypes => "Comparing query output SQL types".into(),
        Text::QueryShouldOrderRows => "Query should return ordered rows.".into(),
        Text::QueryShouldNotOrderRows => {
            "No explicit row ordering should be enforced in query.".into()
        }
        Text::RowsAreBeingOrdered => "Rows are being ordered.".into(),
        Text::RowsAreNotBeingOrdered => "Rows are not being ordered.".into(),
        Text::CorrectRowsWrongOrder => "The rows are correct but in the wrong order.".into(),
        Text::ComparingTableLayout { table } => {
            format!("Comparing the table layout of \"{table}\".")
        }
        Text::ComparingTableContent { table } => {
            format!("Comparing the table content of \"{table}\".")
        }
    }
}

fn dutch(text: &Text) -> String {
    match text {
        Text::AddASemicolon => {
            "Voeg een puntkomma ';' toe aan het einde van elke SQL query.".into()
        }
        Text::InvalidSingleQuoteTableName { table } => format!(
            "Fout: De database bevat een tabel naam ({table}) die een enkele aanhalingsteken (apostrof) bevat."
        ),
        Text::SubmissionWrongQueryType { submitted } => format!(
            "Fout: de ingediende query is van een ander type ({submitted}) dan verwacht."
        ),
        Text::SubmissionForbiddenSymbolRegex { value } => {
            format!("Fout: de ingediende query mag niet `{value}` bevatten.")
        }
        Text::SubmissionMandatorySymbolRegex { value } => {
            format!("Fout: de ingediende query moet `{value}` bevatten.")
        }
        Text::SubmissionForbiddenFullRegex { value } => {
            format!("Fout: de ingediende query mag niet voldoen aan `{value}`.")
        }
        Text::SubmissionMandatoryFullRegex { value } => {
            format!("Fout: de ingediende query moet voldoen aan `{value}`.")
        }
        Text::SubmissionContainsMoreQueries {
            submitted,
            expected,
        } => format!(
            "Fout: de ingediende oplossing bestaat uit meer query's ({submitted}) dan verwacht ({expected}). \
             Zorg ervoor dat elke query correct eindigt op een puntkomma."
        ),
        Text::SubmissionContainsLessQueries {
            submitted,
            expected,
        } => format!(
            "Fout: de ingediende oplossing bestaat uit minder query's ({submitted}) dan verwacht ({expected}). \
             Zorg ervoor dat elke query correct eindigt op een puntkomma."
        ),
        Text::DifferentRowCount {
            expected,
            submitted,
        } => format!("Verwachtte {expected} rijen, uw aantal rijen is {submitted}."),
        Text::DifferentColumnCount {
            expected,
            submitted,
        } => format!("Verwachtte {expected} kolommen, uw aantal kolommen is {submitted}."),
        Text::ComparingQueryOutputCsvContent => {
            "Vergelijken van de query output in csv formaat".into()
        }
        Text::ComparingQueryOutputTypes => "Vergelijken van de query output SQL types".into(),
        Text::QueryShouldOrderRows => "De query moet de rijen gesorteerd teruggeven.".into(),
        Text::QueryShouldNotOrderRows => {
            "De query mag de rijen niet expliciet gaan sorteren.".into()
        }
        Text::RowsAreBeingOrdered => "De rijen worden gesorteerd.".into(),
        Text::RowsAreNotBeingOrdered => "De rijen worden niet gesorteerd.".into(),
        Text::CorrectRowsWrongOrder => {
            "Het query resultaat bevat de juiste rijen, maar in de verkeerde volgorde.".into()
        }
        Text::ComparingTableLayout { table } => {
            format!("Vergelijken van de tabel lay-out van \"{table}\".")
        }
        Text::ComparingTableContent { table } => {
            format!("Vergelijken van de tabel inhoud van \"{table}\".")
        }
    }
}
