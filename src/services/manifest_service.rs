//! Exportador de manifiestos de ruta
//!
//! Serializa una `Route` hidratada a un PDF con lopdf. No contiene reglas
//! de negocio: recibe el agregado ya cargado y solo lo formatea.

use std::io::Write;
use std::path::PathBuf;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};

use crate::models::{Delivery, Route};
use crate::utils::errors::{AppError, AppResult};

const PAGE_WIDTH: i64 = 595;
const PAGE_HEIGHT: i64 = 842;
const MARGIN: i64 = 50;
const LINE_HEIGHT: i64 = 16;
const TITLE_SIZE: i64 = 18;
const BODY_SIZE: i64 = 11;

/// Líneas que caben en una página A4 con los márgenes fijos
const LINES_PER_PAGE: usize = ((PAGE_HEIGHT - 2 * MARGIN) / LINE_HEIGHT) as usize;
/// Ancho útil de texto, en puntos
const TEXT_WIDTH: i64 = PAGE_WIDTH - 2 * MARGIN;

#[derive(Debug, Clone, PartialEq)]
enum Line {
    Title(String),
    Text(String),
    Blank,
}

/// Genera los manifiestos en un directorio fijo
#[derive(Debug, Clone)]
pub struct ManifestExporter {
    output_dir: PathBuf,
}

impl ManifestExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// `Route_<id>_<ddmmyyyy>.pdf` dentro del directorio de salida
    pub fn output_path(&self, route: &Route) -> PathBuf {
        self.output_dir.join(format!(
            "Route_{}_{}.pdf",
            route.id,
            route.date.format("%d%m%Y")
        ))
    }

    /// Escribe el manifiesto y devuelve la ruta del archivo
    pub async fn export(&self, route: Route) -> AppResult<PathBuf> {
        if route.deliveries.is_empty() {
            return Err(AppError::Conflict(format!(
                "Route {} has no deliveries to print",
                route.id
            )));
        }

        let path = self.output_path(&route);
        let dir = self.output_dir.clone();
        let target = path.clone();

        tokio::task::spawn_blocking(move || -> AppResult<()> {
            std::fs::create_dir_all(&dir).map_err(|e| {
                AppError::Manifest(format!("cannot create {}: {}", dir.display(), e))
            })?;
            let mut document = render(&route)?;
            document.save(&target).map_err(|e| {
                AppError::Manifest(format!("cannot write {}: {}", target.display(), e))
            })?;
            Ok(())
        })
        .await
        .map_err(|e| AppError::Internal(format!("manifest task failed: {}", e)))??;

        tracing::info!("📄 Manifest written to {}", path.display());
        Ok(path)
    }
}

/// Escribe el PDF de la ruta en cualquier destino
pub fn write_to<W: Write>(route: &Route, target: &mut W) -> AppResult<()> {
    let mut document = render(route)?;
    document
        .save_to(target)
        .map_err(|e| AppError::Manifest(e.to_string()))
}

fn manifest_lines(route: &Route) -> Vec<Line> {
    let mut lines = vec![
        Line::Title("Route Manifest".to_string()),
        Line::Blank,
        Line::Text(format!("Route: {}", route.name)),
        Line::Text(format!("Date: {}", route.date.format("%d/%m/%Y"))),
        Line::Text(format!("Deliveries: {}", route.deliveries.len())),
        Line::Blank,
    ];

    for delivery in &route.deliveries {
        lines.extend(delivery_lines(delivery));
    }

    lines
        .into_iter()
        .flat_map(|line| match line {
            Line::Text(text) => wrap_text(&text).into_iter().map(Line::Text).collect(),
            other => vec![other],
        })
        .collect()
}

fn delivery_lines(delivery: &Delivery) -> Vec<Line> {
    let mut lines = vec![
        Line::Text(format!("Beneficiary: {}", delivery.beneficiary.name)),
        Line::Text(format!("Address: {}", delivery.beneficiary.address)),
        Line::Text(format!(
            "Description: {}",
            delivery.description.as_deref().unwrap_or("-")
        )),
        Line::Text("Items:".to_string()),
    ];
    lines.extend(
        delivery
            .items
            .iter()
            .map(|line| Line::Text(format!("    {} x {}", line.quantity, line.item.name))),
    );
    lines.push(Line::Text(format!("Total units: {}", delivery.total_quantity())));
    lines.push(Line::Text(format!("Status: {}", delivery.status.label())));
    lines.push(Line::Text("-".repeat(90)));
    lines
}

/// Ancho de un glifo de Helvetica en milésimas del tamaño de fuente (métricas AFM)
fn glyph_width(c: char) -> i64 {
    match c {
        '\'' => 191,
        'i' | 'j' | 'l' => 222,
        '|' => 260,
        ' ' | '!' | ',' | '.' | '/' | ':' | ';' | 'I' | '[' | '\\' | ']' | 'f' | 't' => 278,
        '(' | ')' | '-' | '`' | 'r' => 333,
        '{' | '}' => 334,
        '"' => 355,
        '*' => 389,
        '^' => 469,
        'J' | 'c' | 'k' | 's' | 'v' | 'x' | 'y' | 'z' => 500,
        '+' | '<' | '=' | '>' | '~' => 584,
        'F' | 'T' | 'Z' => 611,
        'A' | 'B' | 'E' | 'K' | 'P' | 'S' | 'V' | 'X' | 'Y' | '&' => 667,
        'C' | 'D' | 'H' | 'N' | 'R' | 'U' | 'w' => 722,
        'G' | 'O' | 'Q' => 778,
        'M' | 'm' => 833,
        '%' => 889,
        'W' => 944,
        '@' => 1015,
        c if c.is_ascii() => 556,
        c if c.is_uppercase() => 778,
        _ => 556,
    }
}

/// Ancho del texto en milésimas de punto al tamaño del cuerpo
fn text_width(text: &str) -> i64 {
    text.chars().map(glyph_width).sum::<i64>() * BODY_SIZE
}

fn fits(width: i64) -> bool {
    width <= TEXT_WIDTH * 1000
}

/// Parte una línea en palabras para que ninguna supere el ancho útil.
/// Las líneas de continuación conservan la sangría inicial; una palabra
/// más ancha que la página se corta por caracteres.
fn wrap_text(text: &str) -> Vec<String> {
    let indent: String = text.chars().take_while(|c| *c == ' ').collect();
    let mut lines = Vec::new();
    let mut current = indent.clone();

    for word in text.split_whitespace() {
        let has_words = current.len() > indent.len();
        let separator = if has_words { " " } else { "" };
        if fits(text_width(&current) + text_width(separator) + text_width(word)) {
            current.push_str(separator);
            current.push_str(word);
            continue;
        }

        if has_words {
            lines.push(std::mem::replace(&mut current, indent.clone()));
        }
        for c in word.chars() {
            if current.len() > indent.len() && !fits(text_width(&current) + glyph_width(c) * BODY_SIZE) {
                lines.push(std::mem::replace(&mut current, indent.clone()));
            }
            current.push(c);
        }
    }

    if current.len() > indent.len() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Helvetica con WinAnsi cubre Latin-1; el resto se sustituye por '?'
fn encode_text(text: &str) -> Object {
    let bytes = text
        .chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?'))
        .collect();
    Object::String(bytes, StringFormat::Literal)
}

fn page_operations(lines: &[Line]) -> Vec<Operation> {
    let mut operations = vec![Operation::new("BT", vec![])];
    let mut y = PAGE_HEIGHT - MARGIN;

    for line in lines {
        let (font, size, text) = match line {
            Line::Title(text) => ("F2", TITLE_SIZE, Some(text)),
            Line::Text(text) => ("F1", BODY_SIZE, Some(text)),
            Line::Blank => ("F1", BODY_SIZE, None),
        };

        if let Some(text) = text {
            operations.push(Operation::new(
                "Tf",
                vec![Object::Name(font.as_bytes().to_vec()), Object::Integer(size)],
            ));
            operations.push(Operation::new(
                "Tm",
                vec![
                    Object::Integer(1),
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(1),
                    Object::Integer(MARGIN),
                    Object::Integer(y),
                ],
            ));
            operations.push(Operation::new("Tj", vec![encode_text(text)]));
        }
        y -= LINE_HEIGHT;
    }

    operations.push(Operation::new("ET", vec![]));
    operations
}

fn font(document: &mut Document, base_font: &str) -> ObjectId {
    document.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => Object::Name(base_font.as_bytes().to_vec()),
        "Encoding" => "WinAnsiEncoding",
    })
}

/// Construye el documento completo, paginando por número de líneas
fn render(route: &Route) -> AppResult<Document> {
    let lines = manifest_lines(route);

    let mut document = Document::with_version("1.5");
    let pages_id = document.new_object_id();
    let regular = font(&mut document, "Helvetica");
    let bold = font(&mut document, "Helvetica-Bold");
    let resources_id = document.add_object(dictionary! {
        "Font" => dictionary! {
            "F1" => regular,
            "F2" => bold,
        },
    });

    let mut kids = Vec::new();
    for chunk in lines.chunks(LINES_PER_PAGE) {
        let content = Content {
            operations: page_operations(chunk),
        };
        let encoded = content
            .encode()
            .map_err(|e| AppError::Manifest(format!("cannot encode page: {}", e)))?;
        let content_id = document.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = document.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(Object::Reference(page_id));
    }

    let page_count = kids.len() as i64;
    document.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(page_count),
            "Resources" => resources_id,
            "MediaBox" => vec![
                Object::Integer(0),
                Object::Integer(0),
                Object::Integer(PAGE_WIDTH),
                Object::Integer(PAGE_HEIGHT),
            ],
        }),
    );
    let catalog_id = document.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    document.trailer.set("Root", catalog_id);
    document.compress();

    Ok(document)
}
