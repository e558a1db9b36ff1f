//! Operator-facing labels.

pub const REQUEST_FAILED: &str = "请求失败";
pub const KEY_REQUIRED: &str = "键不能为空";

pub const SET_OK: &str = "设置成功";
pub const SET_FAILED: &str = "设置失败";
pub const DELETE_OK: &str = "删除成功";
pub const DELETE_FAILED: &str = "删除失败";
pub const MSET_OK: &str = "批量设置成功";
pub const MSET_FAILED: &str = "批量设置失败";
pub const MDELETE_OK: &str = "批量删除成功";
pub const MDELETE_FAILED: &str = "批量删除失败";
pub const CONFIG_UPDATE_OK: &str = "配置更新成功";
pub const CONFIG_UPDATE_FAILED: &str = "配置更新失败";
pub const CONFIG_FETCH_FAILED: &str = "获取配置失败";

pub const HEALTHY: &str = "健康";
pub const UNHEALTHY: &str = "不健康";
pub const HEALTH_ERROR: &str = "错误";
pub const SERVICE_UNREACHABLE: &str = "无法连接到服务";

/// `"{label}: {detail}"`, the shape of every outcome line.
pub fn labelled(label: &str, detail: impl std::fmt::Display) -> String {
    format!("{label}: {detail}")
}
