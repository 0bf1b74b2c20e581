use crate::domain::{
    input::Input,
    output::Output,
    resource::Function,
};

/// Identity of the caller's authentication context.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub subscription_id: Output<String>,
    pub tenant_id: Output<String>,
    pub client_id: Output<String>,
    pub object_id: Output<String>,
}

/// `azure-native:authorization:getClientConfig`
pub fn get_client_config() -> ClientConfig {
    let result = Output::invoke(Function::GetClientConfig, Input::object::<&str>([]));
    ClientConfig {
        subscription_id: result.clone().field("subscriptionId").as_string(),
        tenant_id: result.clone().field("tenantId").as_string(),
        client_id: result.clone().field("clientId").as_string(),
        object_id: result.field("objectId").as_string(),
    }
}
