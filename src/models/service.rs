use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Service {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub category: String,
    pub description: String,
    pub cost: f64,
    pub unit: String,
    pub image: String,
    #[serde(default)]
    pub rating: f64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateServiceRequest {
    pub name: String,
    pub category: String,
    pub description: String,
    pub cost: f64,
    pub unit: String,
    pub image: String,
    pub rating: Option<f64>,
}

impl CreateServiceRequest {
    pub fn into_service(self) -> Service {
        Service {
            id: None,
            name: self.name,
            category: self.category,
            description: self.description,
            cost: self.cost,
            unit: self.unit,
            image: self.image,
            rating: self.rating.unwrap_or(0.0),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateServiceRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub cost: Option<f64>,
    pub unit: Option<String>,
    pub image: Option<String>,
    pub rating: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedServices {
    pub services: Vec<Service>,
    pub total: u64,
    pub page: u64,
    pub total_pages: u64,
}
