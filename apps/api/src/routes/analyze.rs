//! POST /analyze multipart resume upload.
//!
//! Fields:
//! - `resume`: PDF file (filename must end in `.pdf`)
//! - `text`: plain-text resume, used when no file is uploaded
//! - `job_role` (or `role`): target role or job description

use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use tracing::debug;

use crate::errors::AppError;
use crate::evaluation::{EvaluationRequest, EvaluationResult};
use crate::extraction::DocumentInput;
use crate::state::AppState;

struct UploadedFile {
    filename: Option<String>,
    data: Bytes,
}

#[derive(Default)]
struct AnalyzeForm {
    resume: Option<UploadedFile>,
    text: Option<String>,
    role: Option<String>,
}

impl AnalyzeForm {
    async fn read(multipart: &mut Multipart) -> Result<Self, AppError> {
        let mut form = AnalyzeForm::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("resume") => {
                    let filename = field.file_name().map(str::to_string);
                    let data = field.bytes().await?;
                    form.resume = Some(UploadedFile { filename, data });
                }
                Some("text") => form.text = Some(field.text().await?),
                Some("job_role") | Some("role") => form.role = Some(field.text().await?),
                Some(other) => debug!("Ignoring unknown multipart field '{other}'"),
                None => debug!("Ignoring unnamed multipart field"),
            }
        }

        Ok(form)
    }

    fn into_request(self) -> Result<EvaluationRequest, AppError> {
        let role = self
            .role
            .ok_or_else(|| AppError::Validation("job_role is required".to_string()))?;

        let document = match (self.resume, self.text) {
            (Some(file), _) => {
                if let Some(filename) = &file.filename {
                    if !filename.to_ascii_lowercase().ends_with(".pdf") {
                        return Err(AppError::UnsupportedMediaType(
                            "Only PDF files are supported".to_string(),
                        ));
                    }
                }
                DocumentInput::Pdf(file.data)
            }
            (None, Some(text)) => DocumentInput::Text(text),
            (None, None) => {
                return Err(AppError::Validation(
                    "Either a 'resume' PDF file or a 'text' field is required".to_string(),
                ))
            }
        };

        Ok(EvaluationRequest { document, role })
    }
}

pub async fn handle_analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<EvaluationResult>, AppError> {
    let request = AnalyzeForm::read(&mut multipart).await?.into_request()?;
    let result = state.evaluator.evaluate(request).await?;
    Ok(Json(result))
}
