// 基本的なデータ型と幾何カーネル
pub mod common;

// 衝突判定の基本インターフェース（trait）定義
pub mod traits;

// 障害物と経路のモデル
pub mod mine;
pub mod net;
pub mod hazard;
pub mod path;

// 便利な re-export
pub use common::*;
pub use traits::*;
pub use mine::{BottomMine, MineKind, MooredMine, Placement, SurfaceMine};
pub use net::Net;
pub use hazard::Hazard;
pub use path::{Path, PathGenerator, RouteStrategy};
