// 変換サービスとの通信
//
// - client: reqwestのラッパー（タイムアウト、エラー変換、URL組み立て）
// - conversion: 動画情報の取得、変換リクエスト、ファイル保存
// - types: リクエスト/レスポンスの型

pub mod client;
pub mod conversion;
pub mod error;
pub mod types;
