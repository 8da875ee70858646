use crate::error::ApiError;
use crate::importer;
use crate::merge;
use crate::models::{
    CombinedParams, SearchParams, SharedState, Source, UploadResponse, VideoListResponse,
};
use axum::{
    body::Body,
    extract::{Query, Request, State},
    http::header::CONTENT_TYPE,
    response::Json,
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use http_body_util::BodyExt;
use multer::Multipart;
use std::convert::Infallible;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use tracing::info;

/// Build the application router. Split out of `main` so tests can drive
/// it directly.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/upload-excel", post(upload_excel_handler))
        .route("/search-videos", get(search_videos_handler))
        .route("/combined-videos", get(combined_videos_handler))
        .fallback_service(ServeDir::new(&state.config.static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Upload a spreadsheet of manual video records, replacing the previous
/// batch.
pub async fn upload_excel_handler(
    State(state): State<SharedState>,
    request: Request<Body>,
) -> Result<Json<UploadResponse>, ApiError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::BadRequest("Missing Content-Type header".to_string()))?;

    let boundary = multer::parse_boundary(content_type)
        .map_err(|e| ApiError::BadRequest(format!("Invalid multipart request: {}", e)))?;

    let body_bytes = request
        .into_body()
        .collect()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Failed to read request: {}", e)))?
        .to_bytes();

    let constraints = multer::Constraints::new()
        .size_limit(multer::SizeLimit::new().whole_stream(state.config.max_upload_size));
    let stream = futures::stream::once(async move { Ok::<Bytes, Infallible>(body_bytes) });
    let mut multipart = Multipart::with_constraints(stream, boundary, constraints);

    let mut upload: Option<(String, Bytes)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Error parsing multipart request: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("").to_string();
        if !importer::has_spreadsheet_extension(&file_name) {
            return Err(ApiError::BadRequest(format!(
                "Unsupported file type '{}': expected .xlsx or .xls",
                file_name
            )));
        }

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read file: {}", e)))?;
        upload = Some((file_name, data));
    }

    let (file_name, file_bytes) =
        upload.ok_or_else(|| ApiError::BadRequest("No file uploaded".to_string()))?;

    let rows = importer::parse_workbook(&file_bytes)?;
    let count = state.store.replace_all(&rows).await?;

    info!(
        "[POST /upload-excel] imported {} rows from '{}' ({} bytes)",
        count,
        file_name,
        file_bytes.len()
    );

    Ok(Json(UploadResponse {
        status: "ok".to_string(),
        count,
    }))
}

/// Search YouTube within the publish window and return enriched records.
pub async fn search_videos_handler(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<VideoListResponse>, ApiError> {
    let videos = state
        .youtube
        .search_and_enrich(
            &params.query,
            &params.start,
            &params.end,
            params.max_results as usize,
        )
        .await?;

    info!(
        "[GET /search-videos] {} videos for '{}'",
        videos.len(),
        params.query
    );

    Ok(Json(VideoListResponse {
        total: videos.len(),
        videos,
    }))
}

/// Merge YouTube results and filtered manual records into one
/// newest-first list.
pub async fn combined_videos_handler(
    State(state): State<SharedState>,
    Query(params): Query<CombinedParams>,
) -> Result<Json<VideoListResponse>, ApiError> {
    let api_videos = match params.source {
        Source::All | Source::Youtube => {
            state
                .youtube
                .search_and_enrich(
                    &params.query,
                    &params.start,
                    &params.end,
                    params.max_results as usize,
                )
                .await?
        }
        Source::Manual => Vec::new(),
    };

    let manual_videos = match params.source {
        Source::All | Source::Manual => {
            let rows = state.store.list_all().await?;
            merge::filter_manual(rows, &params.query, &params.start, &params.end)
        }
        Source::Youtube => Vec::new(),
    };

    info!(
        "[GET /combined-videos] {} api + {} manual for '{}'",
        api_videos.len(),
        manual_videos.len(),
        params.query
    );

    let videos = merge::combine_and_sort(api_videos, manual_videos);

    Ok(Json(VideoListResponse {
        total: videos.len(),
        videos,
    }))
}
