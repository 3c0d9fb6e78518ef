use crate::{beatmap::Beatmap, frequency::top_values, table::TextTable};

use super::{Artifact, ReportInput, ReportJob};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Artist,
    Title,
    Source,
    Creator,
}

impl TextField {
    pub const ALL: [TextField; 4] = [
        TextField::Artist,
        TextField::Title,
        TextField::Source,
        TextField::Creator,
    ];

    pub fn column(&self) -> &'static str {
        match self {
            TextField::Artist => "artist",
            TextField::Title => "title",
            TextField::Source => "source",
            TextField::Creator => "creator",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            TextField::Artist => "artists",
            TextField::Title => "titles",
            TextField::Source => "sources",
            TextField::Creator => "creators",
        }
    }

    pub fn value<'a>(&self, beatmap: &'a Beatmap) -> Option<&'a str> {
        match self {
            TextField::Artist => beatmap.artist.as_deref(),
            TextField::Title => beatmap.title.as_deref(),
            TextField::Source => beatmap.source.as_deref(),
            TextField::Creator => beatmap.creator.as_deref(),
        }
    }
}

pub fn top_table(job: &ReportJob, field: TextField, input: &ReportInput<'_>) -> Artifact {
    let values = input
        .rows
        .iter()
        .filter_map(|row| field.value(&row.beatmap))
        .collect::<Vec<_>>();
    let rows = top_values(values.iter().copied(), input.config.frequency_top)
        .into_iter()
        .map(|(value, count)| vec![value, count.to_string()])
        .collect();
    let table = TextTable::new(
        vec![field.column().to_string(), "count".to_string()],
        rows,
    );
    Artifact::table(job, table, values.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::ReportConfig, enrich::Enricher};

    #[test]
    fn missing_values_are_not_counted() {
        let enricher = Enricher::new(Default::default()).unwrap();
        let rows = enricher.enrich(vec![
            Beatmap {
                source: Some("Touhou".into()),
                ..Beatmap::default()
            },
            Beatmap::default(),
            Beatmap {
                source: Some("Touhou".into()),
                ..Beatmap::default()
            },
        ]);
        let config = ReportConfig::default();
        let job = ReportJob::Frequency(TextField::Source);
        let artifact = top_table(&job, TextField::Source, &ReportInput::new(&rows, &config));
        let table = artifact.text_table().unwrap();
        assert_eq!(table.headers, vec!["source", "count"]);
        assert_eq!(table.rows, vec![vec!["Touhou".to_string(), "2".to_string()]]);
        assert_eq!(artifact.rows_used, 2);
        assert_eq!(artifact.slug, "top-sources");
    }
}
