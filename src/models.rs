// Wire types for the document-processing API. Field names follow the JSON
// the service speaks (camelCase); enum variants map to the literal strings
// the service uses.

use crate::error::MintError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kind of vehicle document being submitted.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentType {
    Coc,
    TitvOld,
    TitvNew,
    Reduced,
    SingleApproval,
    Cdc,
}

impl DocumentType {
    pub const ALL: [DocumentType; 6] = [
        DocumentType::Coc,
        DocumentType::TitvOld,
        DocumentType::TitvNew,
        DocumentType::Reduced,
        DocumentType::SingleApproval,
        DocumentType::Cdc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Coc => "coc",
            DocumentType::TitvOld => "titv-old",
            DocumentType::TitvNew => "titv-new",
            DocumentType::Reduced => "reduced",
            DocumentType::SingleApproval => "single-approval",
            DocumentType::Cdc => "cdc",
        }
    }
}

/// Type reported on a technical card: any submittable document type, or a
/// card entered by hand on the service side.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "kebab-case")]
pub enum CardType {
    Coc,
    TitvOld,
    TitvNew,
    Reduced,
    SingleApproval,
    Cdc,
    Manual,
}

impl CardType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardType::Manual => "manual",
            CardType::Coc => DocumentType::Coc.as_str(),
            CardType::TitvOld => DocumentType::TitvOld.as_str(),
            CardType::TitvNew => DocumentType::TitvNew.as_str(),
            CardType::Reduced => DocumentType::Reduced.as_str(),
            CardType::SingleApproval => DocumentType::SingleApproval.as_str(),
            CardType::Cdc => DocumentType::Cdc.as_str(),
        }
    }
}

impl From<DocumentType> for CardType {
    fn from(value: DocumentType) -> Self {
        match value {
            DocumentType::Coc => CardType::Coc,
            DocumentType::TitvOld => CardType::TitvOld,
            DocumentType::TitvNew => CardType::TitvNew,
            DocumentType::Reduced => CardType::Reduced,
            DocumentType::SingleApproval => CardType::SingleApproval,
            DocumentType::Cdc => CardType::Cdc,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum VehicleCategory {
    M1,
    M3,
    N1,
    N3,
    L,
    O,
    T,
    Tr,
    Os,
    Osr,
}

impl VehicleCategory {
    pub const ALL: [VehicleCategory; 10] = [
        VehicleCategory::M1,
        VehicleCategory::M3,
        VehicleCategory::N1,
        VehicleCategory::N3,
        VehicleCategory::L,
        VehicleCategory::O,
        VehicleCategory::T,
        VehicleCategory::Tr,
        VehicleCategory::Os,
        VehicleCategory::Osr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleCategory::M1 => "M1",
            VehicleCategory::M3 => "M3",
            VehicleCategory::N1 => "N1",
            VehicleCategory::N3 => "N3",
            VehicleCategory::L => "L",
            VehicleCategory::O => "O",
            VehicleCategory::T => "T",
            VehicleCategory::Tr => "TR",
            VehicleCategory::Os => "OS",
            VehicleCategory::Osr => "OSR",
        }
    }
}

/// Lifecycle of a submission on the service:
/// PENDING -> STRAIGHTENING -> RECOGNIZING -> COMPLETED | FAILED,
/// with ABORTED and RETRIEVED as terminal alternates.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProcessStatus {
    Pending,
    Straightening,
    Recognizing,
    Completed,
    Failed,
    Retrieved,
    Aborted,
}

impl ProcessStatus {
    pub const ALL: [ProcessStatus; 7] = [
        ProcessStatus::Pending,
        ProcessStatus::Straightening,
        ProcessStatus::Recognizing,
        ProcessStatus::Completed,
        ProcessStatus::Failed,
        ProcessStatus::Retrieved,
        ProcessStatus::Aborted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessStatus::Pending => "PENDING",
            ProcessStatus::Straightening => "STRAIGHTENING",
            ProcessStatus::Recognizing => "RECOGNIZING",
            ProcessStatus::Completed => "COMPLETED",
            ProcessStatus::Failed => "FAILED",
            ProcessStatus::Retrieved => "RETRIEVED",
            ProcessStatus::Aborted => "ABORTED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            ProcessStatus::Pending | ProcessStatus::Straightening | ProcessStatus::Recognizing
        )
    }
}

fn valid_values<T>(all: &[T], name: fn(&T) -> &'static str) -> String {
    all.iter().map(name).collect::<Vec<_>>().join(", ")
}

impl FromStr for DocumentType {
    type Err = MintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        DocumentType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| {
                MintError::validation(format!(
                    "invalid document type: {}. Valid values: {}",
                    s,
                    valid_values(&DocumentType::ALL, DocumentType::as_str)
                ))
            })
    }
}

impl FromStr for VehicleCategory {
    type Err = MintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        VehicleCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| {
                MintError::validation(format!(
                    "invalid vehicle category: {}. Valid values: {}",
                    s,
                    valid_values(&VehicleCategory::ALL, VehicleCategory::as_str)
                ))
            })
    }
}

impl FromStr for ProcessStatus {
    type Err = MintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_uppercase();
        ProcessStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == wanted)
            .ok_or_else(|| {
                MintError::validation(format!(
                    "invalid status: {}. Valid values: {}",
                    s,
                    valid_values(&ProcessStatus::ALL, ProcessStatus::as_str)
                ))
            })
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for CardType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for VehicleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for ProcessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parse a process id given on the command line.
pub fn parse_uuid(value: &str) -> Result<Uuid, MintError> {
    Uuid::parse_str(value.trim())
        .map_err(|_| MintError::validation(format!("invalid id (must be a UUID): {}", value)))
}

/// Content types the service accepts for document images.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeType {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/tiff")]
    Tiff,
    #[serde(rename = "application/pdf")]
    Pdf,
}

impl MimeType {
    /// Look up the mime type for a file extension, with or without the
    /// leading dot, ignoring case.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "jpg" | "jpeg" => Some(MimeType::Jpeg),
            "png" => Some(MimeType::Png),
            "tif" | "tiff" => Some(MimeType::Tiff),
            "pdf" => Some(MimeType::Pdf),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MimeType::Jpeg => "image/jpeg",
            MimeType::Png => "image/png",
            MimeType::Tiff => "image/tiff",
            MimeType::Pdf => "application/pdf",
        }
    }
}

/// One encoded document image, ready to be placed in a submission.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ImagePayload {
    #[serde(rename = "base64")]
    pub content: String,
    pub file_name: String,
    #[serde(rename = "fileType")]
    pub mime_type: MimeType,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug, Default)]
pub struct LoginResponse {
    #[serde(default)]
    pub token: Option<String>,
}

/// Body of `POST /process/pool`.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProcessPoolRequest {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub document_type: DocumentType,
    pub category: VehicleCategory,
    pub images: Vec<ImagePayload>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extract_accuracy: Option<bool>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct ProcessPoolResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AbortResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct License {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub customer_id: String,
    pub itv: String,
}

/// Technical card summary as it appears in the list view.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CardSummary {
    #[serde(rename = "type")]
    pub card_type: CardType,
    pub category: VehicleCategory,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessDocumentItem {
    pub id: String,
    pub license: License,
    pub technical_card: CardSummary,
    pub status: ProcessStatus,
    #[serde(default)]
    pub document_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Body of `GET /process`.
#[derive(Serialize, Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListProcessResponse {
    #[serde(default)]
    pub process_documents: Vec<ProcessDocumentItem>,
}

/// Extracted technical-card fields. Section codes ("A.1", "F.2", ...) and any
/// other key the service adds land in `sections` as raw JSON; the named
/// fields are the ones that are not section codes.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalCardData {
    #[serde(default)]
    pub matricula: Option<String>,
    #[serde(default)]
    pub certificado: Option<String>,
    #[serde(default)]
    pub fecha_emision: Option<String>,
    #[serde(default)]
    pub num_ejes: Option<String>,
    #[serde(default)]
    pub num_ruedas: Option<String>,
    #[serde(default)]
    pub num_neumaticos: Option<String>,
    #[serde(default)]
    pub homologaciones: Option<Vec<String>>,
    #[serde(default)]
    pub observaciones: Option<Vec<String>>,
    #[serde(default)]
    pub reformas: Option<Vec<String>>,
    #[serde(flatten)]
    pub sections: BTreeMap<String, Value>,
}

impl TechnicalCardData {
    /// Text value of a section code. Null, empty and non-string values all
    /// read as absent.
    pub fn section(&self, code: &str) -> Option<&str> {
        self.sections
            .get(code)
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TechnicalCard {
    #[serde(rename = "type")]
    pub card_type: CardType,
    pub category: VehicleCategory,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub vehicle_license: Option<String>,
    #[serde(default)]
    pub vin: Option<String>,
    #[serde(default)]
    pub ict: Option<bool>,
    #[serde(default)]
    pub data: TechnicalCardData,
}

/// Body of `GET /process/{id}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedDocument {
    pub id: String,
    #[serde(default)]
    pub document_id: Option<String>,
    pub license: License,
    pub technical_card: TechnicalCard,
    pub status: ProcessStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// Section codes of a technical card with a short description, in the order
/// they are printed.
pub const SECTION_FIELDS: &[(&str, &str)] = &[
    ("A.1", "Base vehicle manufacturer name"),
    ("A.2", "Base vehicle manufacturer address"),
    ("B.1", "Completed vehicle manufacturer name"),
    ("B.2", "Completed vehicle manufacturer address"),
    ("C.I", "ITV code"),
    ("C.L", "Vehicle classification"),
    ("C.V", "VIN check"),
    ("D.1", "Make"),
    ("D.2", "Type / Variant / Version"),
    ("D.3", "Commercial name"),
    ("D.6", "Origin"),
    ("E", "Vehicle identification number"),
    ("EP", "Protection structure"),
    ("EP.1", "Protection structure make"),
    ("EP.2", "Protection structure model"),
    ("EP.3", "Protection structure approval number"),
    ("EP.4", "Protection structure identification number"),
    ("F.1", "Technically permissible maximum laden mass"),
    ("F.1.1", "Technically permissible maximum mass per axle"),
    ("F.1.5", "Technically permissible maximum mass on fifth wheel or coupling pivot"),
    ("F.2", "Permissible maximum laden mass in service"),
    ("F.2.1", "Authorised maximum mass per axle"),
    ("F.3", "Technically permissible maximum mass of the combination"),
    ("F.3.1", "Authorised maximum mass of the combination"),
    ("F.4", "Overall height"),
    ("F.5", "Overall width"),
    ("F.5.1", "Maximum bodywork width"),
    ("F.6", "Overall length"),
    ("F.6.1", "Maximum bodywork length"),
    ("F.7", "Front track"),
    ("F.7.1", "Rear track"),
    ("F.8", "Rear overhang"),
    ("F.8.1", "Maximum bodywork rear overhang"),
    ("G", "Mass in running order"),
    ("G.1", "Unladen mass for category L vehicles"),
    ("G.2", "Minimum permissible mass of the completed vehicle"),
    ("J", "Vehicle category"),
    ("J.1", "Bodywork"),
    ("J.2", "Class"),
    ("J.3", "Luggage compartment volume"),
    ("K", "Base vehicle type-approval number"),
    ("K.1", "Completed vehicle type-approval number"),
    ("K.2", "Base vehicle TITV certificate number"),
    ("L", "Number of axles and wheels"),
    ("L.0", "Number and position of axles with twin wheels"),
    ("L.1", "Powered axles"),
    ("L.2", "Tyre dimensions"),
    ("M.1", "Wheelbase"),
    ("M.4", "Distance between fifth wheel or coupling pivot and last axle"),
    ("O.1", "Braked towable mass"),
    ("O.1.1", "Drawbar trailer"),
    ("O.1.2", "Semi-trailer"),
    ("O.1.3", "Centre-axle trailer"),
    ("O.1.4", "Unbraked trailer"),
    ("O.2.1", "Towable mass with mechanical brakes"),
    ("O.2.2", "Towable mass with inertia brakes"),
    ("O.2.3", "Towable mass with hydraulic or pneumatic brakes"),
    ("O.3", "Service brake type"),
    ("P.1", "Engine capacity"),
    ("P.1.1", "Number and arrangement of cylinders"),
    ("P.2", "Engine power"),
    ("P.2.1", "Fiscal power"),
    ("P.3", "Fuel or power source"),
    ("P.5", "Engine identification code"),
    ("P.5.1", "Engine manufacturer"),
    ("Q", "Power to mass ratio"),
    ("R", "Colour"),
    ("S.1", "Number of seats"),
    ("S.1.1", "Number of standing places"),
    ("S.1.2", "Seat belts"),
    ("S.2", "Standing places"),
    ("T", "Maximum speed"),
    ("U.1", "Stationary sound level"),
    ("U.2", "Engine speed for the sound level measurement"),
    ("V.7", "CO2 emissions"),
    ("V.8", "CO emissions"),
    ("V.9", "Emissions level"),
    ("Z", "Year and short series number"),
];

/// Description of a section code, if it is one of [`SECTION_FIELDS`].
pub fn section_description(code: &str) -> Option<&'static str> {
    SECTION_FIELDS
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, description)| *description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&DocumentType::SingleApproval).unwrap(),
            "\"single-approval\""
        );
        assert_eq!(serde_json::to_string(&VehicleCategory::Osr).unwrap(), "\"OSR\"");
        assert_eq!(
            serde_json::to_string(&ProcessStatus::Straightening).unwrap(),
            "\"STRAIGHTENING\""
        );
        let manual: CardType = serde_json::from_str("\"manual\"").unwrap();
        assert_eq!(manual, CardType::Manual);
    }

    #[test]
    fn parse_enums_from_cli_values() {
        assert_eq!("titv-new".parse::<DocumentType>().unwrap(), DocumentType::TitvNew);
        assert_eq!("m1".parse::<VehicleCategory>().unwrap(), VehicleCategory::M1);
        assert_eq!("completed".parse::<ProcessStatus>().unwrap(), ProcessStatus::Completed);

        let err = "truck".parse::<VehicleCategory>().unwrap_err();
        assert!(err.to_string().contains("M1, M3, N1, N3, L, O, T, TR, OS, OSR"));
        assert!("manual".parse::<DocumentType>().is_err());
    }

    #[test]
    fn uuid_validation() {
        assert!(parse_uuid("731cb083-7d83-4ce7-a0ce-1a3b19b7e422").is_ok());
        let err = parse_uuid("not-a-uuid").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Validation);
    }

    #[test]
    fn mime_type_table() {
        assert_eq!(MimeType::from_extension(".JPG"), Some(MimeType::Jpeg));
        assert_eq!(MimeType::from_extension("jpeg"), Some(MimeType::Jpeg));
        assert_eq!(MimeType::from_extension("tif"), Some(MimeType::Tiff));
        assert_eq!(MimeType::from_extension(".pdf"), Some(MimeType::Pdf));
        assert_eq!(MimeType::from_extension(".gif"), None);
    }

    #[test]
    fn image_payload_wire_shape() {
        let image = ImagePayload {
            content: "AAEC".into(),
            file_name: "card.png".into(),
            mime_type: MimeType::Png,
        };
        let value = serde_json::to_value(&image).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"base64": "AAEC", "fileName": "card.png", "fileType": "image/png"})
        );
    }

    #[test]
    fn processed_document_keeps_section_codes() {
        let body = serde_json::json!({
            "id": "p-1",
            "documentId": null,
            "license": {"id": "l-1", "code": "X", "customerId": "c-1", "itv": "ITV-01"},
            "technicalCard": {
                "type": "coc",
                "category": "M1",
                "model": "Model S",
                "vehicleLicense": "1234ABC",
                "vin": null,
                "ict": true,
                "data": {
                    "matricula": "1234ABC",
                    "F.1": "2100",
                    "D.1": null,
                    "observaciones": ["none"]
                }
            },
            "status": "COMPLETED",
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:05:00Z"
        });
        let doc: ProcessedDocument = serde_json::from_value(body).unwrap();
        let data = &doc.technical_card.data;
        assert_eq!(data.section("F.1"), Some("2100"));
        assert_eq!(data.section("D.1"), None);
        assert_eq!(data.matricula.as_deref(), Some("1234ABC"));
        assert_eq!(data.observaciones.as_deref(), Some(&["none".to_string()][..]));
        assert!(!data.sections.contains_key("matricula"));
    }

    #[test]
    fn non_string_extras_do_not_break_decoding() {
        let body = serde_json::json!({
            "id": "p-2",
            "license": {"id": null, "code": "X", "customerId": "c-1", "itv": "ITV-01"},
            "technicalCard": {
                "type": "titv-new",
                "category": "N1",
                "data": {
                    "F.1": "1550",
                    "accuracy": 0.93,
                    "confidence": {"E": 0.8},
                    "pages": [1, 2]
                }
            },
            "status": "COMPLETED",
            "createdAt": "2024-05-01T10:00:00Z",
            "updatedAt": "2024-05-01T10:05:00Z"
        });
        let doc: ProcessedDocument = serde_json::from_value(body).unwrap();
        let data = &doc.technical_card.data;
        assert_eq!(data.section("F.1"), Some("1550"));
        assert_eq!(data.section("accuracy"), None);
        assert_eq!(data.sections["accuracy"], serde_json::json!(0.93));
        assert_eq!(data.sections.len(), 4);
    }

    #[test]
    fn section_table_lookup() {
        assert_eq!(section_description("E"), Some("Vehicle identification number"));
        assert_eq!(section_description("X.9"), None);
        assert!(SECTION_FIELDS.len() > 70);
    }
}
