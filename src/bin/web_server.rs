//! Web server for the steganography API
//!
//! - `POST /api/encode`   multipart: `image`, and either `message` or `file`;
//!   optional `compress` ("false" disables zlib). Returns the PNG as base64.
//! - `POST /api/decode`   multipart: `image`, optional `auto` ("true").
//! - `POST /api/capacity` multipart: `image`.
//! - `GET  /api/health`

use axum::{
    extract::{multipart::Multipart, DefaultBodyLimit, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose, Engine as _};
use clap::Parser;
use log::{error, info};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use uuid::Uuid;

use cicada_stego::processing::payload::{file_extension, PayloadFrame};
use cicada_stego::server::{ServerConfig, StegoCore};
use cicada_stego::utils::init_logger;
use cicada_stego::StegoError;

/// Command-line arguments for the web server binary
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Server configuration file (TOML); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Serialize)]
struct EncodeResponse {
    success: bool,
    message: String,
    carrier_image_base64: String,
}

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum DecodeResponse {
    Text { text: String, bits_per_channel: u8 },
    File { extension: String, content_base64: String, bits_per_channel: u8 },
    Legacy { text: String, bits_per_channel: u8 },
    Unknown { content_base64: String, bits_per_channel: u8 },
}

impl DecodeResponse {
    fn new(frame: PayloadFrame, bits_per_channel: u8) -> Self {
        match frame {
            PayloadFrame::Text(text) => Self::Text { text, bits_per_channel },
            PayloadFrame::File { extension, content } => Self::File {
                extension,
                content_base64: general_purpose::STANDARD.encode(content),
                bits_per_channel,
            },
            PayloadFrame::Legacy(text) => Self::Legacy { text, bits_per_channel },
            PayloadFrame::Unknown(data) => Self::Unknown {
                content_base64: general_purpose::STANDARD.encode(data),
                bits_per_channel,
            },
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    required_bytes: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_bytes: Option<usize>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(error: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: error.into(),
            required_bytes: None,
            max_bytes: None,
        }),
    )
}

/// Map a pipeline failure to a status code; codec errors are the caller's fault.
fn pipeline_error(e: anyhow::Error) -> ApiError {
    match e.downcast_ref::<StegoError>() {
        Some(StegoError::CapacityExceeded { required, max }) => (
            StatusCode::PAYLOAD_TOO_LARGE,
            Json(ErrorResponse {
                error: e.to_string(),
                required_bytes: Some(*required),
                max_bytes: Some(*max),
            }),
        ),
        Some(_) => bad_request(e.to_string()),
        None => {
            error!("❌ Request failed: {:#}", e);
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse {
                    error: format!("{:#}", e),
                    required_bytes: None,
                    max_bytes: None,
                }),
            )
        }
    }
}

struct AppState {
    core: StegoCore,
}

/// Fields collected from a multipart request.
#[derive(Default)]
struct UploadForm {
    image: Option<Vec<u8>>,
    message: Option<String>,
    file: Option<(String, Vec<u8>)>,
    compress: Option<bool>,
    auto: bool,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| bad_request(format!("Failed to read multipart data: {}", e)))?
        {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "image" => {
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| bad_request(format!("Failed to read image data: {}", e)))?;
                    form.image = Some(data.to_vec());
                }
                "file" => {
                    let filename = field.file_name().unwrap_or("").to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| bad_request(format!("Failed to read file data: {}", e)))?;
                    form.file = Some((filename, data.to_vec()));
                }
                "message" | "compress" | "auto" => {
                    let value = field
                        .text()
                        .await
                        .map_err(|e| bad_request(format!("Failed to read {}: {}", name, e)))?;
                    match name.as_str() {
                        "message" => form.message = Some(value),
                        "compress" => form.compress = Some(value.trim() != "false"),
                        _ => form.auto = value.trim() == "true",
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    fn take_image(&mut self) -> Result<Vec<u8>, ApiError> {
        self.image.take().ok_or_else(|| bad_request("No image provided"))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);

    info!("🚀 Initializing web server...");

    let config = match &args.config {
        Some(path) => ServerConfig::from_file(path)?,
        None => ServerConfig::default(),
    };
    // reject a bad codec setting at startup rather than per request
    let bits = config.stego.bits_per_channel()?;

    let state = Arc::new(AppState {
        core: StegoCore::new(config.stego.clone()),
    });

    let app = Router::new()
        .route("/api/encode", post(encode_handler))
        .route("/api/decode", post(decode_handler))
        .route("/api/capacity", post(capacity_handler))
        .route("/api/health", get(health_check))
        .layer(DefaultBodyLimit::max(config.server.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = config.server.address.as_str();
    info!("🌐 Web server running on http://{}", addr);
    info!(
        "🔧 {} bits per channel, compression {}",
        bits,
        if config.stego.compress { "on" } else { "off" }
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "steganography-api",
    }))
}

async fn encode_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let image = form.take_image()?;

    let frame = match (form.message.take(), form.file.take()) {
        (Some(message), _) => PayloadFrame::text(message.trim()),
        (None, Some((filename, content))) => {
            PayloadFrame::file(file_extension(std::path::Path::new(&filename)), content)
        }
        (None, None) => return Err(bad_request("Provide either a message or a file")),
    }
    .map_err(|e| bad_request(e.to_string()))?;

    let mut core = state.core.clone();
    if let Some(compress) = form.compress {
        let mut stego = core.config().clone();
        stego.compress = compress;
        core = StegoCore::new(stego);
    }

    let request_id = Uuid::new_v4();
    let kind = frame.kind();
    let png = core
        .encode_image(request_id, image, frame)
        .await
        .map_err(pipeline_error)?;

    Ok((
        StatusCode::OK,
        Json(EncodeResponse {
            success: true,
            message: format!("Successfully encoded {} payload", kind),
            carrier_image_base64: general_purpose::STANDARD.encode(&png),
        }),
    ))
}

async fn decode_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let image = form.take_image()?;

    let (bits, frame) = state
        .core
        .decode_image(Uuid::new_v4(), image, form.auto)
        .await
        .map_err(pipeline_error)?;

    Ok(Json(DecodeResponse::new(frame, bits.get())))
}

async fn capacity_handler(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut form = UploadForm::read(multipart).await?;
    let image = form.take_image()?;

    let report = state.core.capacity(image).await.map_err(pipeline_error)?;
    Ok(Json(report))
}
