//! An in-memory dhcpsrv server.
//!
//! Keeps subnets, their elements and leases, option definitions and option
//! values in a single `parking_lot::RwLock`. Enumerations page through
//! ordered collections: the resume handle is the index of the next entry and
//! `preferred_maximum` caps the entry count of a page.

use async_trait::async_trait;
use dcerpc::Result;
use dhcpm::dhcpsrv::v1::*;
use dhcpm::types::*;
use dhcpm::win32::*;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Version reported by `R_DhcpGetVersion`.
pub const SERVER_VERSION: (u32, u32) = (5, 6);

/// Seconds between 1601-01-01 and 1970-01-01.
const FILETIME_UNIX_OFFSET: u64 = 11_644_473_600;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum ScopeKey {
    Default,
    Global,
    Subnet(DhcpIpAddress),
    Reserved(DhcpIpAddress, DhcpIpAddress),
    MScope(String),
}

impl From<&OptionScopeInfo> for ScopeKey {
    fn from(scope: &OptionScopeInfo) -> Self {
        match scope {
            OptionScopeInfo::Default => Self::Default,
            OptionScopeInfo::Global => Self::Global,
            OptionScopeInfo::Subnet(address) => Self::Subnet(*address),
            OptionScopeInfo::Reserved(r) => {
                Self::Reserved(r.reserved_ip_subnet_address, r.reserved_ip_address)
            }
            OptionScopeInfo::MScope(name) => Self::MScope(name.clone()),
        }
    }
}

#[derive(Debug, Clone)]
struct Subnet {
    info: SubnetInfo,
    elements: Vec<SubnetElementDataV4>,
    clients: BTreeMap<DhcpIpAddress, ClientInfoV4>,
}

impl Subnet {
    fn contains(&self, address: DhcpIpAddress) -> bool {
        address & self.info.subnet_mask == self.info.subnet_address
    }

    fn range_size(&self) -> u32 {
        self.elements
            .iter()
            .filter_map(|e| match &e.element {
                SubnetElementV4::IpRanges(r)
                | SubnetElementV4::IpRangesDhcpOnly(r)
                | SubnetElementV4::IpRangesDhcpBootp(r)
                | SubnetElementV4::IpRangesBootpOnly(r) => {
                    Some(r.end_address.wrapping_sub(r.start_address).wrapping_add(1))
                }
                _ => None,
            })
            .sum()
    }

    fn has_lease_within(&self, range: &IpRange) -> bool {
        self.clients
            .range(range.start_address..=range.end_address)
            .next()
            .is_some()
    }
}

#[derive(Debug, Default)]
struct State {
    subnets: BTreeMap<DhcpIpAddress, Subnet>,
    options: BTreeMap<DhcpOptionId, DhcpOption>,
    values: BTreeMap<ScopeKey, BTreeMap<DhcpOptionId, OptionData>>,
    config: ServerConfigInfoV4,
}

impl State {
    fn subnet_of(&self, address: DhcpIpAddress) -> Option<&Subnet> {
        self.subnets.values().find(|s| s.contains(address))
    }

    fn find_client(&self, search: &SearchInfo) -> Option<(DhcpIpAddress, &ClientInfoV4)> {
        self.subnets.iter().find_map(|(subnet, s)| {
            s.clients
                .values()
                .find(|c| match search {
                    SearchInfo::ClientIpAddress(ip) => c.client_ip_address == *ip,
                    SearchInfo::ClientHardwareAddress(hw) => c.client_hardware_address == *hw,
                    SearchInfo::ClientName(name) => c.client_name.eq_ignore_ascii_case(name),
                })
                .map(|c| (*subnet, c))
        })
    }
}

/// One page of an ordered collection.
struct Page<T> {
    items: Vec<T>,
    resume: ResumeHandle,
    total: u32,
    status: u32,
}

fn page<T: Clone>(items: &[T], resume: ResumeHandle, preferred_maximum: u32) -> Page<T> {
    let total = items.len() as u32;
    let start = resume as usize;
    if start >= items.len() {
        return Page {
            items: Vec::new(),
            resume,
            total,
            status: ERROR_NO_MORE_ITEMS,
        };
    }
    let end = start.saturating_add(preferred_maximum.max(1) as usize).min(items.len());
    Page {
        items: items[start..end].to_vec(),
        resume: end as u32,
        total,
        status: if end < items.len() {
            ERROR_MORE_DATA
        } else {
            ERROR_SUCCESS
        },
    }
}

fn now_filetime() -> DateTime {
    let unix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    DateTime::from_filetime((unix + FILETIME_UNIX_OFFSET) * 10_000_000)
}

/// A DHCP server database held entirely in memory.
#[derive(Debug)]
pub struct MemoryServer {
    state: RwLock<State>,
    started: DateTime,
}

impl Default for MemoryServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryServer {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(State::default()),
            started: now_filetime(),
        }
    }

    /// Number of subnets currently defined.
    pub fn subnet_count(&self) -> usize {
        self.state.read().subnets.len()
    }

    /// Define `count` /24 subnets starting at `first`, each with one range.
    pub fn seed_subnets(&self, first: DhcpIpAddress, count: u32) {
        let mut state = self.state.write();
        for n in 0..count {
            let subnet_address = first.wrapping_add(n << 8);
            state.subnets.insert(
                subnet_address,
                Subnet {
                    info: SubnetInfo {
                        subnet_address,
                        subnet_mask: 0xFFFF_FF00,
                        subnet_name: format!("scope-{n}"),
                        ..Default::default()
                    },
                    elements: vec![SubnetElementDataV4::ip_range(
                        subnet_address | 10,
                        subnet_address | 200,
                    )],
                    clients: BTreeMap::new(),
                },
            );
        }
    }
}

#[async_trait]
impl DhcpServerServer for MemoryServer {
    async fn create_subnet(&self, request: CreateSubnetRequest) -> Result<CreateSubnetResponse> {
        let info = request.subnet_info.unwrap_or_default();
        let mut state = self.state.write();
        let return_value = if state.subnets.contains_key(&request.subnet_address) {
            ERROR_DHCP_SUBNET_EXITS
        } else if info.subnet_address != request.subnet_address
            || info.subnet_address & info.subnet_mask != info.subnet_address
        {
            ERROR_DHCP_SUBNET_EXISTS
        } else {
            debug!(subnet = %std::net::Ipv4Addr::from(info.subnet_address), "subnet created");
            state.subnets.insert(
                request.subnet_address,
                Subnet {
                    info,
                    elements: Vec::new(),
                    clients: BTreeMap::new(),
                },
            );
            ERROR_SUCCESS
        };
        Ok(CreateSubnetResponse { return_value })
    }

    async fn set_subnet_info(&self, request: SetSubnetInfoRequest) -> Result<SetSubnetInfoResponse> {
        let info = request.subnet_info.unwrap_or_default();
        let mut state = self.state.write();
        let return_value = match state.subnets.get_mut(&request.subnet_address) {
            None => ERROR_DHCP_SUBNET_NOT_PRESENT,
            Some(_) if info.subnet_address != request.subnet_address => ERROR_INVALID_PARAMETER,
            Some(subnet) => {
                subnet.info = info;
                ERROR_SUCCESS
            }
        };
        Ok(SetSubnetInfoResponse { return_value })
    }

    async fn get_subnet_info(&self, request: GetSubnetInfoRequest) -> Result<GetSubnetInfoResponse> {
        let state = self.state.read();
        Ok(match state.subnets.get(&request.subnet_address) {
            Some(subnet) => GetSubnetInfoResponse {
                subnet_info: Some(subnet.info.clone()),
                return_value: ERROR_SUCCESS,
            },
            None => GetSubnetInfoResponse {
                subnet_info: None,
                return_value: ERROR_DHCP_SUBNET_NOT_PRESENT,
            },
        })
    }

    async fn enum_subnets(&self, request: EnumSubnetsRequest) -> Result<EnumSubnetsResponse> {
        let state = self.state.read();
        let subnets: Vec<DhcpIpAddress> = state.subnets.keys().copied().collect();
        let page = page(&subnets, request.resume, request.preferred_maximum);
        Ok(EnumSubnetsResponse {
            resume: page.resume,
            elements_read: page.items.len() as u32,
            elements_total: page.total,
            enum_info: Some(IpArray {
                elements: page.items,
            }),
            return_value: page.status,
        })
    }

    async fn delete_subnet(&self, request: DeleteSubnetRequest) -> Result<DeleteSubnetResponse> {
        let mut state = self.state.write();
        let leased = state
            .subnets
            .get(&request.subnet_address)
            .map(|subnet| !subnet.clients.is_empty());
        let return_value = match leased {
            None => ERROR_DHCP_SUBNET_NOT_PRESENT,
            Some(true) if request.force_flag == ForceFlag::NoForce => ERROR_DHCP_ELEMENT_CANT_REMOVE,
            Some(_) => {
                state.subnets.remove(&request.subnet_address);
                state.values.remove(&ScopeKey::Subnet(request.subnet_address));
                ERROR_SUCCESS
            }
        };
        Ok(DeleteSubnetResponse { return_value })
    }

    async fn add_subnet_element_v4(
        &self,
        request: AddSubnetElementV4Request,
    ) -> Result<AddSubnetElementV4Response> {
        let data = request.add_element_info.unwrap_or_default();
        let mut state = self.state.write();
        let Some(subnet) = state.subnets.get_mut(&request.subnet_address) else {
            return Ok(AddSubnetElementV4Response {
                return_value: ERROR_DHCP_SUBNET_NOT_PRESENT,
            });
        };
        let return_value = match &data.element {
            SubnetElementV4::IpRanges(r)
            | SubnetElementV4::IpRangesDhcpOnly(r)
            | SubnetElementV4::IpRangesDhcpBootp(r)
            | SubnetElementV4::IpRangesBootpOnly(r) => {
                if r.start_address > r.end_address
                    || !subnet.contains(r.start_address)
                    || !subnet.contains(r.end_address)
                {
                    ERROR_DHCP_INVALID_RANGE
                } else if subnet.range_size() > 0 {
                    ERROR_DHCP_IPRANGE_EXITS
                } else {
                    ERROR_SUCCESS
                }
            }
            SubnetElementV4::ExcludedIpRanges(r) => {
                if r.start_address > r.end_address || !subnet.contains(r.start_address) {
                    ERROR_DHCP_INVALID_RANGE
                } else {
                    ERROR_SUCCESS
                }
            }
            SubnetElementV4::ReservedIps(reservation) => {
                let taken = subnet.elements.iter().any(|e| {
                    matches!(&e.element, SubnetElementV4::ReservedIps(other)
                        if other.reserved_ip_address == reservation.reserved_ip_address)
                });
                if !subnet.contains(reservation.reserved_ip_address) {
                    ERROR_DHCP_INVALID_RANGE
                } else if taken {
                    ERROR_DHCP_RESERVEDIP_EXITS
                } else {
                    ERROR_SUCCESS
                }
            }
            SubnetElementV4::SecondaryHosts(_) | SubnetElementV4::IpUsedClusters(_) => {
                ERROR_INVALID_PARAMETER
            }
        };
        if return_value == ERROR_SUCCESS {
            subnet.elements.push(data);
        }
        Ok(AddSubnetElementV4Response { return_value })
    }

    async fn enum_subnet_elements_v4(
        &self,
        request: EnumSubnetElementsV4Request,
    ) -> Result<EnumSubnetElementsV4Response> {
        let state = self.state.read();
        let Some(subnet) = state.subnets.get(&request.subnet_address) else {
            return Ok(EnumSubnetElementsV4Response {
                return_value: ERROR_DHCP_SUBNET_NOT_PRESENT,
                ..Default::default()
            });
        };
        let matching: Vec<SubnetElementDataV4> = subnet
            .elements
            .iter()
            .filter(|e| e.element_type() == request.enum_element_type)
            .cloned()
            .collect();
        let page = page(&matching, request.resume, request.preferred_maximum);
        Ok(EnumSubnetElementsV4Response {
            resume: page.resume,
            elements_read: page.items.len() as u32,
            elements_total: page.total,
            enum_element_info: Some(SubnetElementInfoArrayV4 {
                elements: page.items,
            }),
            return_value: page.status,
        })
    }

    async fn remove_subnet_element_v4(
        &self,
        request: RemoveSubnetElementV4Request,
    ) -> Result<RemoveSubnetElementV4Response> {
        let data = request.remove_element_info.unwrap_or_default();
        let mut state = self.state.write();
        let Some(subnet) = state.subnets.get_mut(&request.subnet_address) else {
            return Ok(RemoveSubnetElementV4Response {
                return_value: ERROR_DHCP_SUBNET_NOT_PRESENT,
            });
        };
        let Some(index) = subnet.elements.iter().position(|e| *e == data) else {
            let return_value = match data.element {
                SubnetElementV4::ReservedIps(_) => ERROR_DHCP_NOT_RESERVED_CLIENT,
                _ => ERROR_DHCP_INVALID_RANGE,
            };
            return Ok(RemoveSubnetElementV4Response { return_value });
        };
        let leased = match &data.element {
            SubnetElementV4::IpRanges(r) => subnet.has_lease_within(r),
            _ => false,
        };
        let return_value = if leased && request.force_flag == ForceFlag::NoForce {
            ERROR_DHCP_ELEMENT_CANT_REMOVE
        } else {
            subnet.elements.remove(index);
            ERROR_SUCCESS
        };
        Ok(RemoveSubnetElementV4Response { return_value })
    }

    async fn create_option(&self, request: CreateOptionRequest) -> Result<CreateOptionResponse> {
        let mut option = request.option_info.unwrap_or_default();
        option.option_id = request.option_id;
        let mut state = self.state.write();
        let return_value = if state.options.contains_key(&request.option_id) {
            ERROR_DHCP_OPTION_EXITS
        } else {
            state.options.insert(request.option_id, option);
            ERROR_SUCCESS
        };
        Ok(CreateOptionResponse { return_value })
    }

    async fn set_option_info(&self, request: SetOptionInfoRequest) -> Result<SetOptionInfoResponse> {
        let mut option = request.option_info.unwrap_or_default();
        option.option_id = request.option_id;
        let mut state = self.state.write();
        let return_value = match state.options.get_mut(&request.option_id) {
            Some(existing) => {
                *existing = option;
                ERROR_SUCCESS
            }
            None => ERROR_DHCP_OPTION_NOT_PRESENT,
        };
        Ok(SetOptionInfoResponse { return_value })
    }

    async fn get_option_info(&self, request: GetOptionInfoRequest) -> Result<GetOptionInfoResponse> {
        let state = self.state.read();
        let option_info = state.options.get(&request.option_id).cloned();
        let return_value = if option_info.is_some() {
            ERROR_SUCCESS
        } else {
            ERROR_DHCP_OPTION_NOT_PRESENT
        };
        Ok(GetOptionInfoResponse {
            option_info,
            return_value,
        })
    }

    async fn remove_option(&self, request: RemoveOptionRequest) -> Result<RemoveOptionResponse> {
        let mut state = self.state.write();
        let return_value = if state.options.remove(&request.option_id).is_some() {
            for values in state.values.values_mut() {
                values.remove(&request.option_id);
            }
            ERROR_SUCCESS
        } else {
            ERROR_DHCP_OPTION_NOT_PRESENT
        };
        Ok(RemoveOptionResponse { return_value })
    }

    async fn enum_options(&self, request: EnumOptionsRequest) -> Result<EnumOptionsResponse> {
        let state = self.state.read();
        let options: Vec<DhcpOption> = state.options.values().cloned().collect();
        let page = page(&options, request.resume, request.preferred_maximum);
        Ok(EnumOptionsResponse {
            resume: page.resume,
            options_read: page.items.len() as u32,
            options_total: page.total,
            options: Some(OptionArray { options: page.items }),
            return_value: page.status,
        })
    }

    async fn set_option_value(&self, request: SetOptionValueRequest) -> Result<SetOptionValueResponse> {
        let scope = request.scope_info.unwrap_or_default();
        let value = request.option_value.unwrap_or_default();
        let mut state = self.state.write();
        let return_value = if !state.options.contains_key(&request.option_id) {
            ERROR_DHCP_OPTION_NOT_PRESENT
        } else if matches!(scope, OptionScopeInfo::Subnet(s) if !state.subnets.contains_key(&s)) {
            ERROR_DHCP_SUBNET_NOT_PRESENT
        } else {
            state
                .values
                .entry(ScopeKey::from(&scope))
                .or_default()
                .insert(request.option_id, value);
            ERROR_SUCCESS
        };
        Ok(SetOptionValueResponse { return_value })
    }

    async fn set_option_values(
        &self,
        request: SetOptionValuesRequest,
    ) -> Result<SetOptionValuesResponse> {
        let scope = request.scope_info.unwrap_or_default();
        let values = request.option_values.unwrap_or_default().values;
        let mut state = self.state.write();
        if let Some(missing) = values.iter().find(|v| !state.options.contains_key(&v.option_id)) {
            debug!(option_id = missing.option_id, "option not defined");
            return Ok(SetOptionValuesResponse {
                return_value: ERROR_DHCP_OPTION_NOT_PRESENT,
            });
        }
        let scoped = state.values.entry(ScopeKey::from(&scope)).or_default();
        for value in values {
            scoped.insert(value.option_id, value.value);
        }
        Ok(SetOptionValuesResponse {
            return_value: ERROR_SUCCESS,
        })
    }

    async fn get_option_value(&self, request: GetOptionValueRequest) -> Result<GetOptionValueResponse> {
        let scope = request.scope_info.unwrap_or_default();
        let state = self.state.read();
        let option_value = state
            .values
            .get(&ScopeKey::from(&scope))
            .and_then(|values| values.get(&request.option_id))
            .map(|value| OptionValue {
                option_id: request.option_id,
                value: value.clone(),
            });
        let return_value = if option_value.is_some() {
            ERROR_SUCCESS
        } else {
            ERROR_DHCP_OPTION_NOT_PRESENT
        };
        Ok(GetOptionValueResponse {
            option_value,
            return_value,
        })
    }

    async fn enum_option_values(
        &self,
        request: EnumOptionValuesRequest,
    ) -> Result<EnumOptionValuesResponse> {
        let scope = request.scope_info.unwrap_or_default();
        let state = self.state.read();
        let values: Vec<OptionValue> = state
            .values
            .get(&ScopeKey::from(&scope))
            .map(|values| {
                values
                    .iter()
                    .map(|(id, value)| OptionValue {
                        option_id: *id,
                        value: value.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();
        let page = page(&values, request.resume, request.preferred_maximum);
        Ok(EnumOptionValuesResponse {
            resume: page.resume,
            options_read: page.items.len() as u32,
            options_total: page.total,
            option_values: Some(OptionValueArray { values: page.items }),
            return_value: page.status,
        })
    }

    async fn remove_option_value(
        &self,
        request: RemoveOptionValueRequest,
    ) -> Result<RemoveOptionValueResponse> {
        let scope = request.scope_info.unwrap_or_default();
        let mut state = self.state.write();
        let removed = state
            .values
            .get_mut(&ScopeKey::from(&scope))
            .and_then(|values| values.remove(&request.option_id))
            .is_some();
        Ok(RemoveOptionValueResponse {
            return_value: if removed {
                ERROR_SUCCESS
            } else {
                ERROR_DHCP_OPTION_NOT_PRESENT
            },
        })
    }

    async fn create_client_info_v4(
        &self,
        request: CreateClientInfoV4Request,
    ) -> Result<CreateClientInfoV4Response> {
        let client = request.client_info.unwrap_or_default();
        let mut state = self.state.write();
        let subnet = state
            .subnet_of(client.client_ip_address)
            .map(|s| s.info.subnet_address);
        let return_value = match subnet.and_then(|s| state.subnets.get_mut(&s)) {
            None => ERROR_DHCP_SUBNET_NOT_PRESENT,
            Some(s) if s.clients.contains_key(&client.client_ip_address) => ERROR_DHCP_CLIENT_EXISTS,
            Some(s) => {
                s.clients.insert(client.client_ip_address, client);
                ERROR_SUCCESS
            }
        };
        Ok(CreateClientInfoV4Response { return_value })
    }

    async fn set_client_info_v4(
        &self,
        request: SetClientInfoV4Request,
    ) -> Result<SetClientInfoV4Response> {
        let client = request.client_info.unwrap_or_default();
        let mut state = self.state.write();
        let existing = state
            .subnets
            .values_mut()
            .find_map(|s| s.clients.get_mut(&client.client_ip_address));
        let return_value = match existing {
            Some(existing) => {
                *existing = client;
                ERROR_SUCCESS
            }
            None => ERROR_DHCP_JET_ERROR,
        };
        Ok(SetClientInfoV4Response { return_value })
    }

    async fn get_client_info_v4(
        &self,
        request: GetClientInfoV4Request,
    ) -> Result<GetClientInfoV4Response> {
        let search = request.search_info.unwrap_or_default();
        let state = self.state.read();
        Ok(match state.find_client(&search) {
            Some((_, client)) => GetClientInfoV4Response {
                client_info: Some(client.clone()),
                return_value: ERROR_SUCCESS,
            },
            None => GetClientInfoV4Response {
                client_info: None,
                return_value: ERROR_DHCP_JET_ERROR,
            },
        })
    }

    async fn delete_client_info(
        &self,
        request: DeleteClientInfoRequest,
    ) -> Result<DeleteClientInfoResponse> {
        let search = request.client_info.unwrap_or_default();
        let mut state = self.state.write();
        let found = state
            .find_client(&search)
            .map(|(subnet, client)| (subnet, client.client_ip_address));
        let return_value = match found {
            Some((subnet, address)) => {
                if let Some(s) = state.subnets.get_mut(&subnet) {
                    s.clients.remove(&address);
                }
                ERROR_SUCCESS
            }
            None => ERROR_DHCP_JET_ERROR,
        };
        Ok(DeleteClientInfoResponse { return_value })
    }

    async fn enum_subnet_clients_v4(
        &self,
        request: EnumSubnetClientsV4Request,
    ) -> Result<EnumSubnetClientsV4Response> {
        let state = self.state.read();
        let Some(subnet) = state.subnets.get(&request.subnet_address) else {
            return Ok(EnumSubnetClientsV4Response {
                return_value: ERROR_DHCP_SUBNET_NOT_PRESENT,
                ..Default::default()
            });
        };
        let clients: Vec<Option<ClientInfoV4>> = subnet.clients.values().cloned().map(Some).collect();
        let page = page(&clients, request.resume, request.preferred_maximum);
        Ok(EnumSubnetClientsV4Response {
            resume: page.resume,
            clients_read: page.items.len() as u32,
            clients_total: page.total,
            client_info: Some(ClientInfoArrayV4 { clients: page.items }),
            return_value: page.status,
        })
    }

    async fn get_mib_info(&self, _request: GetMibInfoRequest) -> Result<GetMibInfoResponse> {
        let state = self.state.read();
        let scope_info = state
            .subnets
            .values()
            .map(|s| {
                let in_use = s.clients.len() as u32;
                ScopeMibInfo {
                    subnet: s.info.subnet_address,
                    num_addresses_inuse: in_use,
                    num_addresses_free: s.range_size().saturating_sub(in_use),
                    num_pending_offers: 0,
                }
            })
            .collect();
        Ok(GetMibInfoResponse {
            mib_info: Some(MibInfo {
                server_start_time: self.started.clone(),
                scope_info,
                ..Default::default()
            }),
            return_value: ERROR_SUCCESS,
        })
    }

    async fn get_version(&self, _request: GetVersionRequest) -> Result<GetVersionResponse> {
        Ok(GetVersionResponse {
            major_version: SERVER_VERSION.0,
            minor_version: SERVER_VERSION.1,
            return_value: ERROR_SUCCESS,
        })
    }

    async fn server_get_config_v4(
        &self,
        _request: ServerGetConfigV4Request,
    ) -> Result<ServerGetConfigV4Response> {
        Ok(ServerGetConfigV4Response {
            config_info: Some(self.state.read().config.clone()),
            return_value: ERROR_SUCCESS,
        })
    }

    async fn server_set_config_v4(
        &self,
        request: ServerSetConfigV4Request,
    ) -> Result<ServerSetConfigV4Response> {
        let new = request.config_info.unwrap_or_default();
        let set = |flag: u32| request.fields_to_set & flag != 0;
        let mut state = self.state.write();
        let config = &mut state.config;
        if set(fields::SET_API_PROTOCOL_SUPPORT) {
            config.api_protocol_support = new.api_protocol_support;
        }
        if set(fields::SET_DATABASE_NAME) {
            config.database_name = new.database_name.clone();
        }
        if set(fields::SET_DATABASE_PATH) {
            config.database_path = new.database_path.clone();
        }
        if set(fields::SET_BACKUP_PATH) {
            config.backup_path = new.backup_path.clone();
        }
        if set(fields::SET_BACKUP_INTERVAL) {
            config.backup_interval = new.backup_interval;
        }
        if set(fields::SET_DATABASE_LOGGING_FLAG) {
            config.database_logging_flag = new.database_logging_flag;
        }
        if set(fields::SET_RESTORE_FLAG) {
            config.restore_flag = new.restore_flag;
        }
        if set(fields::SET_DATABASE_CLEANUP_INTERVAL) {
            config.database_cleanup_interval = new.database_cleanup_interval;
        }
        if set(fields::SET_DEBUG_FLAG) {
            config.debug_flag = new.debug_flag;
        }
        if set(fields::SET_PING_RETRIES) {
            config.ping_retries = new.ping_retries;
        }
        if set(fields::SET_BOOT_FILE_TABLE) {
            config.boot_table_string = new.boot_table_string.clone();
        }
        if set(fields::SET_AUDIT_LOG_STATE) {
            config.audit_log = new.audit_log;
        }
        Ok(ServerSetConfigV4Response {
            return_value: ERROR_SUCCESS,
        })
    }
}
