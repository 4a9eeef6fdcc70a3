use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::database::corpus::CorpusStore;
use crate::database::reports::{ReportFilter, ReportStore};
use crate::error::{Error, Result};
use crate::models::similarity_report::{ExternalMatch, SimilarityReport, SourceMatch};
use crate::models::submission::SubmissionRecord;
use crate::services::search_service::SearchProvider;
use crate::utils::sequence::find_matching_sentences;
use crate::utils::text::{sentence_chunks, word_count};
use crate::utils::tfidf::{cosine_similarity, TfidfVectorizer};

const SENTENCES_PER_CHUNK: usize = 3;
const MIN_CHUNK_WORDS: usize = 10;

#[derive(Debug, Clone)]
pub struct SimilarityCheck {
    pub text: String,
    pub owner_id: String,
    pub context_id: String,
    pub check_external: bool,
    pub threshold: f64,
}

#[derive(Clone)]
pub struct SimilarityService {
    corpus: Arc<dyn CorpusStore>,
    reports: Arc<dyn ReportStore>,
    search: Option<Arc<dyn SearchProvider>>,
}

impl SimilarityService {
    pub fn new(
        corpus: Arc<dyn CorpusStore>,
        reports: Arc<dyn ReportStore>,
        search: Option<Arc<dyn SearchProvider>>,
    ) -> Self {
        Self {
            corpus,
            reports,
            search,
        }
    }

    /// Checks `text` against the stored corpus and, when asked, the web.
    ///
    /// The text is appended to the corpus whatever the outcome, so checking the
    /// same text twice stores it twice. Storage failures propagate; search
    /// failures only drop the external matches.
    pub async fn check(&self, req: SimilarityCheck) -> Result<SimilarityReport> {
        if req.text.trim().is_empty() {
            return Err(Error::BadRequest("text must not be empty".to_string()));
        }
        if !(req.threshold > 0.0 && req.threshold <= 1.0) {
            return Err(Error::BadRequest(format!(
                "threshold must be in (0, 1], got {}",
                req.threshold
            )));
        }

        let corpus = self.corpus.load_all().await?;
        let matched_sources = match_against_corpus(&req.text, &corpus, req.threshold);

        let external_matches = if req.check_external {
            self.match_external(&req.text, req.threshold).await
        } else {
            Vec::new()
        };

        self.corpus
            .append(&SubmissionRecord::new(&req.owner_id, &req.context_id, &req.text))
            .await?;

        let report = build_report(&req, matched_sources, external_matches);
        self.reports.save(&report).await?;

        tracing::info!(
            report_id = %report.id,
            owner_id = %report.owner_id,
            context_id = %report.context_id,
            corpus_size = corpus.len(),
            score = report.similarity_score,
            detected = report.plagiarism_detected,
            "similarity check complete"
        );
        Ok(report)
    }

    pub async fn get_report(&self, id: Uuid) -> Result<SimilarityReport> {
        self.reports
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Similarity report {} not found", id)))
    }

    pub async fn list_reports(&self, filter: ReportFilter) -> Result<Vec<SimilarityReport>> {
        self.reports.list(filter).await
    }

    async fn match_external(&self, text: &str, threshold: f64) -> Vec<ExternalMatch> {
        let Some(search) = &self.search else {
            return Vec::new();
        };

        let mut matches = Vec::new();
        for chunk in sentence_chunks(text, SENTENCES_PER_CHUNK) {
            if word_count(&chunk) < MIN_CHUNK_WORDS {
                continue;
            }
            match search.search(&chunk).await {
                Ok(Some(found)) if found.similarity_score >= threshold => matches.push(found),
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "web search unavailable, skipping external matches");
                    return Vec::new();
                }
            }
        }
        matches
    }
}

/// Local half of a check: TF-IDF cosine against every stored text, then
/// sentence pairs for the texts that clear the threshold.
pub fn match_against_corpus(
    text: &str,
    corpus: &[SubmissionRecord],
    threshold: f64,
) -> Vec<SourceMatch> {
    if corpus.is_empty() {
        return Vec::new();
    }

    let mut docs: Vec<&str> = corpus.iter().map(|r| r.text.as_str()).collect();
    docs.push(text);

    let mut vectorizer = TfidfVectorizer::new();
    let vectors = vectorizer.fit_transform(&docs);
    let Some((submitted, stored)) = vectors.split_last() else {
        return Vec::new();
    };

    corpus
        .iter()
        .zip(stored)
        .filter_map(|(record, vector)| {
            let score = cosine_similarity(vector, submitted);
            (score >= threshold).then(|| SourceMatch {
                submission_id: record.id,
                owner_id: record.owner_id.clone(),
                context_id: record.context_id.clone(),
                similarity_score: score,
                matching_sentences: find_matching_sentences(text, &record.text, threshold),
            })
        })
        .collect()
}

fn build_report(
    req: &SimilarityCheck,
    matched_sources: Vec<SourceMatch>,
    external_matches: Vec<ExternalMatch>,
) -> SimilarityReport {
    let similarity_score = matched_sources
        .iter()
        .map(|m| m.similarity_score)
        .chain(external_matches.iter().map(|m| m.similarity_score))
        .fold(0.0_f64, f64::max);

    let mut report = SimilarityReport {
        id: Uuid::new_v4(),
        owner_id: req.owner_id.clone(),
        context_id: req.context_id.clone(),
        created_at: Utc::now(),
        plagiarism_detected: !matched_sources.is_empty() || !external_matches.is_empty(),
        similarity_score,
        matched_sources,
        external_matches,
        summary: String::new(),
        submission_text: req.text.clone(),
    };
    report.summary = summarize(&report);
    report
}

/// Plain-text summary of a report.
pub fn summarize(report: &SimilarityReport) -> String {
    if !report.plagiarism_detected {
        return "No plagiarism detected in this submission.".to_string();
    }

    let mut lines = vec![format!(
        "Plagiarism detected with a similarity score of {:.2}.",
        report.similarity_score
    )];

    if !report.matched_sources.is_empty() {
        lines.push(format!(
            "Found {} matches with other student submissions:",
            report.matched_sources.len()
        ));
        for (i, m) in report.matched_sources.iter().enumerate() {
            lines.push(format!(
                "  {}. Submission by student {} for assignment {}",
                i + 1,
                m.owner_id,
                m.context_id
            ));
            lines.push(format!("     Similarity: {:.2}", m.similarity_score));
            if !m.matching_sentences.is_empty() {
                lines.push(format!(
                    "     {} matching sentences found",
                    m.matching_sentences.len()
                ));
            }
        }
    }

    if !report.external_matches.is_empty() {
        lines.push(format!(
            "Found {} matches with web sources:",
            report.external_matches.len()
        ));
        for (i, m) in report.external_matches.iter().enumerate() {
            lines.push(format!("  {}. {}", i + 1, m.source_title));
            lines.push(format!("     URL: {}", m.source_id));
            lines.push(format!("     Similarity: {:.2}", m.similarity_score));
        }
    }

    lines.join("\n")
}
