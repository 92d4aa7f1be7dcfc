//! Query GraphQL - Letture pubbliche

use super::types::{AutoObject, SuchkriterienInput};
use crate::core::AppState;
use crate::domain::read;
use crate::dtos::{Pageable, SearchCriteria};
use async_graphql::{Context, ErrorExtensions, ID, Object};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone, Copy, Debug, Default)]
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Un'auto per id
    async fn auto(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<Option<AutoObject>> {
        let state = ctx.data::<Arc<AppState>>()?;
        let id = read::parse_id(&id).map_err(|e| e.extend())?;
        let auto = read::find_by_id(state, id, false)
            .await
            .map_err(|e| e.extend())?;
        debug!("Auto {} found", auto.id);
        Ok(Some(AutoObject(auto)))
    }

    /// Le auto che soddisfano i criteri (prima pagina di default)
    async fn autos(
        &self,
        ctx: &Context<'_>,
        suchkriterien: Option<SuchkriterienInput>,
    ) -> async_graphql::Result<Option<Vec<AutoObject>>> {
        let state = ctx.data::<Arc<AppState>>()?;
        let criteria = suchkriterien.map(SearchCriteria::from).unwrap_or_default();
        let slice = read::find(state, &criteria, Pageable::default())
            .await
            .map_err(|e| e.extend())?;
        Ok(Some(slice.content.into_iter().map(AutoObject).collect()))
    }
}
