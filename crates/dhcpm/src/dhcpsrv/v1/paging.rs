//! Walking resume-handle enumerations to the end.

use super::client::DhcpServerClient;
use super::protocol::*;
use crate::error::{DhcpError, Result};
use crate::types::{ClientInfoV4, DhcpIpAddress, OptionScopeInfo, OptionValue, SubnetElementDataV4, SubnetElementType};
use std::any::Any;
use std::future::Future;
use tracing::{trace, warn};

/// One decoded enumeration page.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumPage<Item> {
    /// Resume handle for the next call.
    pub resume: u32,
    /// Entries the server returned, null slots included.
    pub read: usize,
    pub items: Vec<Item>,
}

impl<Item> EnumPage<Item> {
    pub fn new(resume: u32, items: Vec<Item>) -> Self {
        Self {
            resume,
            read: items.len(),
            items,
        }
    }
}

/// Drive an enumeration from `resume` until the server has nothing left.
///
/// `call` issues one page request for a resume handle. `extract` turns a
/// reply into an [`EnumPage`]. A page answered with `ERROR_MORE_DATA` is kept
/// and the walk continues. `ERROR_SUCCESS` ends it after that page, and
/// `ERROR_NO_MORE_ITEMS` ends it without one. A `ERROR_MORE_DATA` page that
/// returned no entries also ends the walk. One that hands back the resume
/// handle it was called with fails with [`DhcpError::StalledEnumeration`].
pub async fn paginate<Resp, Item, F, Fut, X>(mut resume: u32, mut call: F, mut extract: X) -> Result<Vec<Item>>
where
    Resp: Any,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Resp>>,
    X: FnMut(Resp) -> EnumPage<Item>,
{
    let mut items = Vec::new();
    loop {
        let (reply, stalled_in) = match call(resume).await {
            Ok(reply) => (reply, None),
            Err(e) if e.is_more_data() => {
                let operation = e.operation().unwrap_or_default();
                (e.into_response::<Resp>()?, Some(operation))
            }
            Err(e) if e.is_no_more_items() => break,
            Err(e) => return Err(e),
        };
        let page = extract(reply);
        trace!(
            resume,
            next = page.resume,
            read = page.read,
            count = page.items.len(),
            more = stalled_in.is_some(),
            "enumeration page"
        );
        if page.read == 0 {
            break;
        }
        items.extend(page.items);
        let Some(operation) = stalled_in else {
            break;
        };
        if page.resume == resume {
            warn!(operation, resume, "resume handle did not advance");
            return Err(DhcpError::StalledEnumeration { operation, resume });
        }
        resume = page.resume;
    }
    Ok(items)
}

/// Every subnet defined on the server.
pub async fn enum_all_subnets<C>(client: &C, server: &str, preferred_maximum: u32) -> Result<Vec<DhcpIpAddress>>
where
    C: DhcpServerClient + ?Sized,
{
    paginate(
        0,
        move |resume| {
            client.enum_subnets(EnumSubnetsRequest {
                server_ip_address: server.to_string(),
                resume,
                preferred_maximum,
            })
        },
        |page: EnumSubnetsResponse| {
            let subnets = page.enum_info.map(|a| a.elements).unwrap_or_default();
            EnumPage::new(page.resume, subnets)
        },
    )
    .await
}

/// Every lease of a subnet. Null slots in a page are skipped, but a page of
/// only null slots still counts as entries read.
pub async fn enum_all_subnet_clients_v4<C>(
    client: &C,
    server: &str,
    subnet_address: DhcpIpAddress,
    preferred_maximum: u32,
) -> Result<Vec<ClientInfoV4>>
where
    C: DhcpServerClient + ?Sized,
{
    paginate(
        0,
        move |resume| {
            client.enum_subnet_clients_v4(EnumSubnetClientsV4Request {
                server_ip_address: server.to_string(),
                subnet_address,
                resume,
                preferred_maximum,
            })
        },
        |page: EnumSubnetClientsV4Response| {
            let slots = page.client_info.map(|a| a.clients).unwrap_or_default();
            EnumPage {
                resume: page.resume,
                read: slots.len(),
                items: slots.into_iter().flatten().collect(),
            }
        },
    )
    .await
}

/// Every element of one type in a subnet.
pub async fn enum_all_subnet_elements_v4<C>(
    client: &C,
    server: &str,
    subnet_address: DhcpIpAddress,
    enum_element_type: SubnetElementType,
    preferred_maximum: u32,
) -> Result<Vec<SubnetElementDataV4>>
where
    C: DhcpServerClient + ?Sized,
{
    paginate(
        0,
        move |resume| {
            client.enum_subnet_elements_v4(EnumSubnetElementsV4Request {
                server_ip_address: server.to_string(),
                subnet_address,
                enum_element_type,
                resume,
                preferred_maximum,
            })
        },
        |page: EnumSubnetElementsV4Response| {
            let elements = page
                .enum_element_info
                .map(|a| a.elements)
                .unwrap_or_default();
            EnumPage::new(page.resume, elements)
        },
    )
    .await
}

/// Every option value set at `scope`.
pub async fn enum_all_option_values<C>(
    client: &C,
    server: &str,
    scope: &OptionScopeInfo,
    preferred_maximum: u32,
) -> Result<Vec<OptionValue>>
where
    C: DhcpServerClient + ?Sized,
{
    paginate(
        0,
        move |resume| {
            client.enum_option_values(EnumOptionValuesRequest {
                server_ip_address: server.to_string(),
                scope_info: Some(scope.clone()),
                resume,
                preferred_maximum,
            })
        },
        |page: EnumOptionValuesResponse| {
            let values = page.option_values.map(|a| a.values).unwrap_or_default();
            EnumPage::new(page.resume, values)
        },
    )
    .await
}
