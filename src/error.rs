use thiserror::Error;

#[derive(Error, Debug)]
pub enum IncidentAiError {
    #[error("Error de configuración: {0}")]
    Config(String),

    #[error("No hay clave de API de Gemini. Defina GEMINI_API_KEY o ejecute `incident-ai config --set-api-key SU_CLAVE`")]
    MissingApiKey,

    #[error("No se indicó el archivo de incidentes. Páselo como argumento o ejecute `incident-ai config --set-input RUTA`")]
    MissingInput,

    #[error("Archivo no encontrado: {0}")]
    FileNotFound(String),

    #[error("Formato no soportado (se requiere .xlsx): {0}")]
    UnsupportedFormat(String),

    #[error("Falta la columna '{0}' en la hoja de entrada")]
    MissingColumn(String),

    #[error("La hoja de entrada está vacía: {0}")]
    EmptySheet(String),

    #[error("Error al leer Excel: {0}")]
    ExcelRead(String),

    #[error("Error al escribir Excel: {0}")]
    ExcelWrite(String),

    #[error("Error en la llamada a la API: {0}")]
    ApiCall(String),

    #[error("Respuesta de la API inválida: {0}")]
    ApiParse(String),

    #[error("Error de JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Error de IO: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] incident_ai_common::Error),
}

impl From<calamine::XlsxError> for IncidentAiError {
    fn from(e: calamine::XlsxError) -> Self {
        IncidentAiError::ExcelRead(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for IncidentAiError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        IncidentAiError::ExcelWrite(e.to_string())
    }
}

/// URL（クエリ含む）はエラー文に残さない
impl From<reqwest::Error> for IncidentAiError {
    fn from(e: reqwest::Error) -> Self {
        IncidentAiError::ApiCall(e.without_url().to_string())
    }
}

pub type Result<T> = std::result::Result<T, IncidentAiError>;
