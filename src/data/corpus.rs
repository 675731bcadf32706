//! Corpus loading and preprocessing

use super::{DataError, Document, Label, RawRecord};
use ndarray::Array1;
use std::collections::HashSet;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Row accounting from preprocessing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PreprocessStats {
    /// Records read from the source
    pub rows_read: usize,
    /// Records dropped because a field was missing
    pub missing_dropped: usize,
    /// Records dropped as exact duplicates of an earlier record
    pub duplicates_dropped: usize,
}

/// Cleaned, deduplicated document collection
#[derive(Debug, Clone)]
pub struct Corpus {
    documents: Vec<Document>,
    stats: PreprocessStats,
}

impl Corpus {
    /// Validate raw records into documents
    ///
    /// Drops records with a missing (or blank) title, content or label, then
    /// drops exact duplicates keeping the first occurrence. Fails on an
    /// unrecognised label value or when nothing survives.
    pub fn from_records<I>(records: I) -> Result<Self, DataError>
    where
        I: IntoIterator<Item = RawRecord>,
    {
        let mut stats = PreprocessStats::default();
        let mut seen: HashSet<(String, String, Label)> = HashSet::new();
        let mut documents = Vec::new();

        for (row, record) in records.into_iter().enumerate() {
            stats.rows_read += 1;

            let (title, content, raw_label) = match (present(record.title), present(record.content), present(record.label)) {
                (Some(t), Some(c), Some(l)) => (t, c, l),
                _ => {
                    stats.missing_dropped += 1;
                    continue;
                }
            };

            let label = Label::parse(&raw_label).ok_or_else(|| DataError::UnknownLabel {
                row: row + 1,
                value: raw_label.clone(),
            })?;

            let key = (title, content, label);
            if seen.contains(&key) {
                stats.duplicates_dropped += 1;
                continue;
            }
            documents.push(Document::new(key.0.clone(), key.1.clone(), label));
            seen.insert(key);
        }

        if documents.is_empty() {
            return Err(DataError::EmptyCorpus);
        }

        debug!(
            rows_read = stats.rows_read,
            missing = stats.missing_dropped,
            duplicates = stats.duplicates_dropped,
            "Preprocessed records"
        );

        Ok(Self { documents, stats })
    }

    /// Read CSV with a header row containing `title`, `content` (or `text`) and `label`
    ///
    /// A header without one of those columns fails with `MissingColumn`.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);

        let headers = reader.headers()?;
        let has = |name: &str| headers.iter().any(|h| h == name);
        if !has("title") {
            return Err(DataError::MissingColumn("title".to_string()));
        }
        if !has("content") && !has("text") {
            return Err(DataError::MissingColumn("content".to_string()));
        }
        if !has("label") {
            return Err(DataError::MissingColumn("label".to_string()));
        }

        let records = reader
            .deserialize::<RawRecord>()
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_records(records)
    }

    /// Load from a CSV file
    pub fn load_csv(path: &Path) -> Result<Self, DataError> {
        let file = std::fs::File::open(path)?;
        let corpus = Self::from_reader(std::io::BufReader::new(file))?;

        info!(
            path = %path.display(),
            documents = corpus.len(),
            "Loaded corpus"
        );

        Ok(corpus)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn stats(&self) -> PreprocessStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn labels(&self) -> Vec<Label> {
        self.documents.iter().map(|d| d.label()).collect()
    }

    /// Labels as a numeric target vector
    pub fn targets(&self) -> Array1<f64> {
        self.documents.iter().map(|d| d.label().as_target()).collect()
    }

    /// Number of documents per class, indexed by [`Label::index`]
    pub fn class_counts(&self) -> [usize; 2] {
        let mut counts = [0; 2];
        for doc in &self.documents {
            counts[doc.label().index()] += 1;
        }
        counts
    }

    /// Documents at the given indices, in index order
    pub fn subset(&self, indices: &[usize]) -> Vec<Document> {
        indices.iter().map(|&i| self.documents[i].clone()).collect()
    }
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_removed() {
        let records = vec![
            RawRecord::new("Title A", "Body A", "Real"),
            RawRecord::new("Title B", "Body B", "Fake"),
            RawRecord::new("Title A", "Body A", "Real"),
        ];

        let corpus = Corpus::from_records(records).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.stats().duplicates_dropped, 1);
    }

    #[test]
    fn test_same_text_different_label_is_not_duplicate() {
        let records = vec![
            RawRecord::new("Title A", "Body A", "Real"),
            RawRecord::new("Title A", "Body A", "Fake"),
        ];

        let corpus = Corpus::from_records(records).unwrap();
        assert_eq!(corpus.len(), 2);
    }

    #[test]
    fn test_missing_fields_removed() {
        let records = vec![
            RawRecord::new("Title A", "Body A", "Real"),
            RawRecord {
                title: Some("Title B".into()),
                content: Some("Body B".into()),
                label: None,
            },
            RawRecord {
                title: Some("   ".into()),
                content: Some("Body C".into()),
                label: Some("Fake".into()),
            },
        ];

        let corpus = Corpus::from_records(records).unwrap();
        assert_eq!(corpus.len(), 1);
        assert_eq!(corpus.stats().missing_dropped, 2);
    }

    #[test]
    fn test_empty_corpus_is_error() {
        let records = vec![RawRecord {
            title: None,
            content: None,
            label: None,
        }];

        assert!(matches!(Corpus::from_records(records), Err(DataError::EmptyCorpus)));
    }

    #[test]
    fn test_unknown_label_is_error() {
        let records = vec![RawRecord::new("t", "c", "maybe")];
        match Corpus::from_records(records) {
            Err(DataError::UnknownLabel { row, value }) => {
                assert_eq!(row, 1);
                assert_eq!(value, "maybe");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_csv_reader_with_extra_columns() {
        let data = "id,title,text,label,subject\n\
                    1,Moon landing faked,Shocking claims,Fake,politics\n\
                    2,Rates unchanged,Central bank holds,Real,economy\n\
                    3,,Body without title,Real,economy\n";

        let corpus = Corpus::from_reader(data.as_bytes()).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.class_counts(), [1, 1]);
        assert_eq!(corpus.documents()[0].label(), Label::Fake);
    }

    #[test]
    fn test_csv_missing_column_is_error() {
        let no_label = "title,text\nRates unchanged,Central bank holds\n";
        match Corpus::from_reader(no_label.as_bytes()) {
            Err(DataError::MissingColumn(column)) => assert_eq!(column, "label"),
            other => panic!("unexpected result: {:?}", other),
        }

        let no_title = "headline,content,label\nRates unchanged,Central bank holds,Real\n";
        assert!(matches!(
            Corpus::from_reader(no_title.as_bytes()),
            Err(DataError::MissingColumn(column)) if column == "title"
        ));

        let no_body = "title,label\nRates unchanged,Real\n";
        assert!(matches!(
            Corpus::from_reader(no_body.as_bytes()),
            Err(DataError::MissingColumn(column)) if column == "content"
        ));
    }
}
