/// Instruction sent alongside every food image. The wording is part of the
/// contract with clients, so keep it byte-for-byte stable.
pub const NUTRITION_PROMPT: &str = r#"Analyze this food image and provide nutritional information in JSON format.

Identify all food items visible and calculate the TOTAL nutritional values for the entire meal:
- total.food_names = array of food names (e.g., ["salmon", "asparagus", "tomatoes"])
- total.quantity = "combined meal"
- total.calories = total calories for entire meal
- total.carbs = total carbohydrates in grams for entire meal
- total.fat = total fat in grams for entire meal
- total.protein = total protein in grams for entire meal

For the message field, provide a brief description like: "Grilled salmon with asparagus and cherry tomatoes - a healthy, protein-rich meal"

DO NOT provide individual food item breakdowns - only the total values and food names array.

Return the response as a JSON object with this structure:
{
  "total": {
    "food_names": ["food1", "food2", "food3"],
    "quantity": "combined meal",
    "calories": 0,
    "carbs": 0,
    "fat": 0,
    "protein": 0
  },
  "message": "Brief meal description"
}"#;
