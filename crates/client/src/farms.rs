//! Farm CRUD endpoints.
//!
//! Reads are cached fresh-until-invalidated; every mutation invalidates
//! the whole `/farms` prefix so list and detail views refetch.

use agriwatch_core::farm::{Farm, FarmCreate, FarmUpdate};
use agriwatch_core::types::FarmId;

use crate::error::ApiClientError;
use crate::http::{cache_key, ApiClient};

impl ApiClient {
    /// `GET /api/farms`: list farms with optional substring search and
    /// skip/limit pagination.
    pub async fn list_farms(
        &self,
        search: Option<&str>,
        skip: Option<u32>,
        limit: Option<u32>,
    ) -> Result<Vec<Farm>, ApiClientError> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(search) = search {
            query.push(("search", search.to_string()));
        }
        if let Some(skip) = skip {
            query.push(("skip", skip.to_string()));
        }
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }

        let key = cache_key("/farms", &query);
        if let Some(cached) = self.cache.get_fresh::<Vec<Farm>>(&key, None) {
            return Ok(cached);
        }

        let farms: Vec<Farm> = self.get_json_query("/farms", &query).await?;
        self.cache.insert(&key, &farms);
        Ok(farms)
    }

    /// `POST /api/farms`: create a farm. The geometry is validated
    /// client-side before the request is sent.
    pub async fn create_farm(&self, farm: &FarmCreate) -> Result<Farm, ApiClientError> {
        farm.geometry.validate()?;
        let created: Farm = self.post_json("/farms", farm).await?;
        self.cache.invalidate_prefix("/farms");
        tracing::debug!(farm_id = %created.id, name = %created.name, "Farm created");
        Ok(created)
    }

    /// `GET /api/farms/{id}`: fetch one farm.
    pub async fn get_farm(&self, id: FarmId) -> Result<Farm, ApiClientError> {
        let key = format!("/farms/{id}");
        if let Some(cached) = self.cache.get_fresh::<Farm>(&key, None) {
            return Ok(cached);
        }

        let farm: Farm = self.get_json(&format!("/farms/{id}")).await?;
        self.cache.insert(&key, &farm);
        Ok(farm)
    }

    /// `PUT /api/farms/{id}`: partial update; unset fields are left
    /// untouched by the backend.
    pub async fn update_farm(
        &self,
        id: FarmId,
        update: &FarmUpdate,
    ) -> Result<Farm, ApiClientError> {
        let farm: Farm = self.put_json(&format!("/farms/{id}"), update).await?;
        self.cache.invalidate_prefix("/farms");
        tracing::debug!(farm_id = %id, "Farm updated");
        Ok(farm)
    }

    /// `DELETE /api/farms/{id}`.
    pub async fn delete_farm(&self, id: FarmId) -> Result<(), ApiClientError> {
        self.delete(&format!("/farms/{id}")).await?;
        self.cache.invalidate_prefix("/farms");
        tracing::debug!(farm_id = %id, "Farm deleted");
        Ok(())
    }
}
