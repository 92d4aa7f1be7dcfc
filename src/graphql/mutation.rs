//! Mutation GraphQL - Scritture, con gli stessi ruoli di REST

use super::types::{AutoInput, AutoUpdateInput, CreatePayload, UpdatePayload};
use crate::core::{AppError, AppState, Claims, require_role};
use crate::domain::{read, write};
use crate::entities::Role;
use async_graphql::{Context, ErrorExtensions, ID, Object};
use std::sync::Arc;
use tracing::{info, warn};

/// Verifica che la richiesta porti un token con uno dei ruoli ammessi
fn authorize(ctx: &Context<'_>, allowed_roles: &[Role]) -> async_graphql::Result<()> {
    let Some(claims) = ctx.data_opt::<Claims>() else {
        warn!("GraphQL mutation without token");
        return Err(AppError::unauthorized("Unauthorized")
            .with_details("Please add the JWT token to the header")
            .extend());
    };
    require_role(claims, allowed_roles).map_err(|e| e.extend())
}

#[derive(Clone, Copy, Debug, Default)]
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    /// Crea un'auto e ne restituisce l'id
    async fn create(&self, ctx: &Context<'_>, input: AutoInput) -> async_graphql::Result<CreatePayload> {
        authorize(ctx, &[Role::Admin, Role::User])?;
        let state = ctx.data::<Arc<AppState>>()?;

        let data = input
            .into_dto()
            .and_then(|dto| dto.into_create())
            .map_err(|e| e.extend())?;
        let id = write::create(state, &data).await.map_err(|e| e.extend())?;

        info!("Auto {} created via GraphQL", id);
        Ok(CreatePayload { id })
    }

    /// Aggiorna un'auto; `input.version` è la versione letta in precedenza
    async fn update(&self, ctx: &Context<'_>, input: AutoUpdateInput) -> async_graphql::Result<UpdatePayload> {
        authorize(ctx, &[Role::Admin, Role::User])?;
        let state = ctx.data::<Arc<AppState>>()?;

        let id = read::parse_id(&input.id).map_err(|e| e.extend())?;
        let data = input
            .to_dto()
            .and_then(|dto| dto.into_update())
            .map_err(|e| e.extend())?;
        let version = write::update(state, id, &data, &write::etag(input.version))
            .await
            .map_err(|e| e.extend())?;

        Ok(UpdatePayload { version })
    }

    /// Cancella un'auto (solo admin)
    async fn delete(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<bool> {
        authorize(ctx, &[Role::Admin])?;
        let state = ctx.data::<Arc<AppState>>()?;

        let id = read::parse_id(&id).map_err(|e| e.extend())?;
        let deleted = write::delete(state, id).await.map_err(|e| e.extend())?;
        Ok(deleted)
    }
}
