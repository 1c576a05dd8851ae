use crate::{
    Res,
    error::Error,
    spotify::gateway::{ApiGateway, ApiRequest},
    types::CurrentUserResponse,
};

/// Returns the id of the user the session belongs to.
pub async fn current_user_id(gateway: &mut ApiGateway) -> Res<String> {
    let response: CurrentUserResponse = gateway.call_as(&ApiRequest::get("/me")).await?;
    response
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::RemoteResponseMalformed("current user has no id".to_string()))
}
