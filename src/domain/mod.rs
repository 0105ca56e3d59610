// ドメイン層
//
// 外部I/Oを持たない純粋なロジック:
// - URL検証と動画IDの抽出
// - 変換リクエストのモデル
// - ワークフローの状態機械と派生表示状態
// - 擬似進捗・表示用フォーマット

pub mod error;
pub mod formatter;
pub mod media;
pub mod progress;
pub mod state;
pub mod validator;
pub mod workflow;
