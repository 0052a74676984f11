use serde::Serialize;

/// Envoltorio estándar de las respuestas de escritura
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success_with_message(data: T, message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Confirmación sin datos (borrados, desasignaciones)
    pub fn done(message: String) -> Self {
        Self {
            success: true,
            message: Some(message),
            data: None,
        }
    }
}
